use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secdraw_config::AppConfig;
use secdraw_core::record::DimensionRecord;
use secdraw_engine::pipeline::TemplateSource;
use tracing::{debug, trace};

const TEMPLATE_ROOTS_ENV: &str = "SECDRAW_TEMPLATE_ROOTS";
const VECTOR_EXTENSIONS: &[&str] = &["dxf"];
const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// 按形状名在模板目录中查找矢量源与栅格图。每条记录单独查找，不做缓存。
#[derive(Debug, Clone)]
pub struct TemplateLocator {
    search_roots: Vec<PathBuf>,
    default_asset: Option<String>,
}

impl TemplateLocator {
    /// 命令行目录优先，其次是配置与环境变量 `SECDRAW_TEMPLATE_ROOTS`。
    pub fn from_config(extra_roots: &[PathBuf], config: &AppConfig) -> Self {
        let mut roots: Vec<PathBuf> = extra_roots.to_vec();

        roots.extend(config.resources.template_roots.iter().cloned());

        if let Some(env_paths) = env::var_os(TEMPLATE_ROOTS_ENV) {
            roots.extend(env::split_paths(&env_paths));
        }

        Self::with_roots(roots, config.resources.default_asset.clone())
    }

    /// 只保留存在的目录，去重后保持靠前优先级。
    pub fn with_roots(roots: impl IntoIterator<Item = PathBuf>, default_asset: Option<String>) -> Self {
        let mut deduped: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !root.is_dir() {
                debug!(path = %root.display(), "模板目录不存在，已忽略");
                continue;
            }
            if !deduped.iter().any(|existing| existing == &root) {
                deduped.push(root);
            }
        }

        TemplateLocator {
            search_roots: deduped,
            default_asset: default_asset.filter(|name| !name.trim().is_empty()),
        }
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    /// 查找顺序：`{shape}.{subshape}`、`{shape}`、目录内不区分大小写的前缀匹配、默认模板。
    pub fn resolve(&self, record: &DimensionRecord) -> Option<TemplateSource> {
        let shape = record.shape_name.trim();
        if let Some(subshape) = record.subshape.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if let Some(source) = self.lookup_exact(&format!("{shape}.{subshape}")) {
                return Some(source);
            }
        }
        if !shape.is_empty() {
            if let Some(source) = self.lookup_exact(shape) {
                return Some(source);
            }
            if let Some(source) = self.lookup_prefix(shape) {
                return Some(source);
            }
        }
        if let Some(default) = &self.default_asset {
            if let Some(source) = self.lookup_exact(default) {
                debug!(record = %record.display_id(), template = %default, "使用默认模板");
                return Some(source);
            }
        }
        debug!(record = %record.display_id(), shape, "未找到模板");
        None
    }

    fn lookup_exact(&self, stem: &str) -> Option<TemplateSource> {
        self.search_roots
            .iter()
            .find_map(|root| Self::lookup_in(root, stem))
    }

    fn lookup_prefix(&self, prefix: &str) -> Option<TemplateSource> {
        let needle = prefix.to_lowercase();
        for root in &self.search_roots {
            let entries = match fs::read_dir(root) {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(path = %root.display(), error = %err, "读取模板目录失败");
                    continue;
                }
            };
            let mut stems: Vec<String> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && is_template_file(path))
                .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string))
                .filter(|stem| stem.to_lowercase().starts_with(&needle))
                .collect();
            stems.sort();
            stems.dedup();
            if let Some(source) = stems.iter().find_map(|stem| Self::lookup_in(root, stem)) {
                return Some(source);
            }
        }
        None
    }

    fn lookup_in(root: &Path, stem: &str) -> Option<TemplateSource> {
        let source = TemplateSource {
            name: stem.to_string(),
            vector: find_with_extension(root, stem, VECTOR_EXTENSIONS),
            raster: find_with_extension(root, stem, RASTER_EXTENSIONS),
        };
        (!source.is_empty()).then_some(source)
    }
}

fn find_with_extension(root: &Path, stem: &str, extensions: &[&str]) -> Option<PathBuf> {
    extensions
        .iter()
        .flat_map(|ext| [ext.to_string(), ext.to_uppercase()])
        .map(|ext| root.join(format!("{stem}.{ext}")))
        .find(|candidate| {
            trace!(candidate = %candidate.display(), "template locator candidate");
            candidate.is_file()
        })
}

fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| {
            VECTOR_EXTENSIONS.contains(&ext.as_str()) || RASTER_EXTENSIONS.contains(&ext.as_str())
        })
}
