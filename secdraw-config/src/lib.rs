use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl AppConfig {
    /// 从显式路径加载配置，并做基本的取值校验。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `SECDRAW_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("SECDRAW_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.canvas.validate()?;
        if self.batch.workers == 0 {
            return Err(ConfigError::Invalid {
                message: "batch.workers 必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 标题超出行数预算时的处理方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleOverflow {
    /// 保留贪心换行结果的前 N 行。
    #[default]
    Truncate,
    /// 同上，但最后一行以 `…` 结尾。
    Ellipsis,
}

/// 背景色键控命中像素的处理方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundPolicy {
    /// alpha 置 0，后续裁边可据此识别内容。
    #[default]
    Transparent,
    /// RGB 置为纯白，保留原 alpha。
    OpaqueWhite,
}

/// 画布尺寸、字号与模板处理参数。字号以像素计。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub output_width: u32,
    pub output_height: u32,
    pub margin: u32,
    pub title_top_margin: u32,
    pub title_gap: u32,
    pub title_font_size: f32,
    pub dimension_font_size: f32,
    pub thickness_font_size: f32,
    pub tag_font_size: f32,
    pub title_max_lines: usize,
    pub title_max_line_chars: usize,
    pub title_overflow: TitleOverflow,
    pub label_padding_x: u32,
    pub label_padding_y: u32,
    pub trim_border: u32,
    pub background_threshold: u8,
    pub background_tolerance: u8,
    pub background_policy: BackgroundPolicy,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            output_width: 1800,
            output_height: 2400,
            margin: 60,
            title_top_margin: 10,
            title_gap: 5,
            title_font_size: 100.0,
            dimension_font_size: 80.0,
            thickness_font_size: 100.0,
            tag_font_size: 120.0,
            title_max_lines: 6,
            title_max_line_chars: 50,
            title_overflow: TitleOverflow::default(),
            label_padding_x: 6,
            label_padding_y: 4,
            trim_border: 20,
            background_threshold: 200,
            background_tolerance: 10,
            background_policy: BackgroundPolicy::default(),
        }
    }
}

impl CanvasConfig {
    /// 内容区宽高必须为正。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let doubled = u64::from(self.margin) * 2;
        if u64::from(self.output_width) <= doubled || u64::from(self.output_height) <= doubled {
            return Err(ConfigError::Invalid {
                message: format!(
                    "画布 {}x{} 容不下两侧各 {} px 的边距",
                    self.output_width, self.output_height, self.margin
                ),
            });
        }
        let sizes = [
            self.title_font_size,
            self.dimension_font_size,
            self.thickness_font_size,
            self.tag_font_size,
        ];
        if sizes.iter().any(|size| !size.is_finite() || *size <= 0.0) {
            return Err(ConfigError::Invalid {
                message: "字号必须为正数".to_string(),
            });
        }
        if self.title_max_lines == 0 || self.title_max_line_chars == 0 {
            return Err(ConfigError::Invalid {
                message: "title_max_lines 与 title_max_line_chars 必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

/// 锚点公式的选择方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    /// 有图纸几何时用图纸空间公式，否则用像素比例公式。
    #[default]
    Auto,
    Drawing,
    Pixel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "LabelConfig::default_show_prefix")]
    pub show_prefix: bool,
    #[serde(default)]
    pub draw_section_anchor: bool,
    #[serde(default)]
    pub anchor_mode: AnchorMode,
}

impl LabelConfig {
    fn default_show_prefix() -> bool {
        true
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            show_prefix: Self::default_show_prefix(),
            draw_section_anchor: false,
            anchor_mode: AnchorMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default = "ResourceConfig::default_template_roots")]
    pub template_roots: Vec<PathBuf>,
    #[serde(default = "ResourceConfig::default_asset")]
    pub default_asset: Option<String>,
    #[serde(default = "ResourceConfig::default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

impl ResourceConfig {
    fn default_template_roots() -> Vec<PathBuf> {
        vec![PathBuf::from("templates")]
    }

    fn default_asset() -> Option<String> {
        Some("default".to_string())
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from("out_images")
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            template_roots: Self::default_template_roots(),
            default_asset: Self::default_asset(),
            output_dir: Self::default_output_dir(),
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "BatchConfig::default_workers")]
    pub workers: usize,
}

impl BatchConfig {
    fn default_workers() -> usize {
        1
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: Self::default_workers(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置取值无效: {message}")]
    Invalid { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_returned_when_file_missing() {
        let cfg = AppConfig::discover().expect("discover should succeed");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.canvas.output_width, 1800);
        assert_eq!(cfg.canvas.output_height, 2400);
        assert_eq!(cfg.canvas.background_policy, BackgroundPolicy::Transparent);
        assert_eq!(cfg.labels.anchor_mode, AnchorMode::Auto);
        assert!(cfg.labels.show_prefix);
        assert_eq!(cfg.resources.template_roots, vec![PathBuf::from("templates")]);
        assert_eq!(cfg.resources.default_asset.as_deref(), Some("default"));
        assert!(cfg.resources.font_path.is_none());
        assert_eq!(cfg.batch.workers, 1);
        cfg.validate().expect("defaults must validate");
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [canvas]
            output_width = 800
            output_height = 1000
            margin = 20
            title_overflow = "ellipsis"
            background_policy = "opaque_white"
            background_threshold = 180

            [labels]
            show_prefix = false
            anchor_mode = "pixel"

            [resources]
            template_roots = ["../templates", "../extra"]
            default_asset = "fallback"
            output_dir = "../out"
            font_path = "../fonts/arial.ttf"

            [batch]
            workers = 4
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.canvas.output_width, 800);
        assert_eq!(cfg.canvas.margin, 20);
        // 未写出的字段保持默认值
        assert_eq!(cfg.canvas.trim_border, 20);
        assert_eq!(cfg.canvas.title_overflow, TitleOverflow::Ellipsis);
        assert_eq!(cfg.canvas.background_policy, BackgroundPolicy::OpaqueWhite);
        assert_eq!(cfg.canvas.background_threshold, 180);
        assert!(!cfg.labels.show_prefix);
        assert_eq!(cfg.labels.anchor_mode, AnchorMode::Pixel);
        assert_eq!(cfg.resources.template_roots.len(), 2);
        assert_eq!(cfg.resources.default_asset.as_deref(), Some("fallback"));
        assert_eq!(
            cfg.resources
                .font_path
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("../fonts/arial.ttf".to_string())
        );
        assert_eq!(cfg.batch.workers, 4);
    }

    #[test]
    fn canvas_without_content_area_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [canvas]
            output_width = 100
            output_height = 1000
            margin = 50
            "#
        )
        .unwrap();

        let err = AppConfig::from_file(file.path()).expect_err("margin too large");
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.batch.workers = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })));
    }
}
