//! 单条记录的端到端渲染：模板解码、键控、适配、锚点计算与合成。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use once_cell::sync::Lazy;
use regex::Regex;
use secdraw_config::{CanvasConfig, LabelConfig};
use secdraw_core::drawing::Drawing;
use secdraw_core::geometry::PixelRect;
use secdraw_core::label::{Anchor, FontTier};
use secdraw_core::record::DimensionRecord;
use secdraw_io::{DrawingLoader, DxfFacade};
use tracing::{debug, warn};

use crate::anchor::{AnchorFrame, FormulaMode, FormulaRegistry};
use crate::compose::{Compositor, PlacedLabel};
use crate::errors::RenderError;
use crate::extract::{DrawingGeometry, extract_geometry};
use crate::fit::{TemplateFit, fit_template};
use crate::keying::KeyFilter;
use crate::preview::render_wireframe;
use crate::text::TextRenderer;
use crate::view::ViewTransform;

static INVALID_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:"*?<>|]+"#).expect("文件名过滤正则无效"));

/// 由标题生成输出文件名（不含扩展名）：去掉非法字符并去除首尾空白，空结果记为 `row`。
pub fn sanitize_file_stem(title: &str) -> String {
    let cleaned = INVALID_FILE_CHARS.replace_all(title, "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "row".to_string()
    } else {
        trimmed.to_string()
    }
}

/// 一条记录解析到的模板文件。同一名称可同时有矢量源与栅格图。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSource {
    pub name: String,
    pub vector: Option<PathBuf>,
    pub raster: Option<PathBuf>,
}

impl TemplateSource {
    pub fn is_empty(&self) -> bool {
        self.vector.is_none() && self.raster.is_none()
    }
}

/// 渲染结果。`degraded` 记录以占位图继续时的原因。
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub image: RgbaImage,
    pub mode: FormulaMode,
    pub anchors: Vec<Anchor>,
    pub labels: Vec<PlacedLabel>,
    pub degraded: Option<RenderError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedRender {
    pub path: PathBuf,
    pub degraded: Option<RenderError>,
}

/// 记录渲染器。构造后只读，可在多个工作线程间共享。
pub struct Renderer {
    canvas: CanvasConfig,
    labels: LabelConfig,
    registry: FormulaRegistry,
    text: Arc<TextRenderer>,
    key_filter: KeyFilter,
}

impl Renderer {
    pub fn new(canvas: CanvasConfig, labels: LabelConfig, text: Arc<TextRenderer>) -> Self {
        let key_filter = KeyFilter::from_config(&canvas);
        Self {
            canvas,
            labels,
            registry: FormulaRegistry::new(),
            text,
            key_filter,
        }
    }

    pub fn with_registry(mut self, registry: FormulaRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn compositor(&self) -> Compositor<'_> {
        Compositor::new(&self.canvas, &self.labels, &self.text)
    }

    /// 渲染单条记录。模板缺失或无法解码时降级为占位图，不返回错误。
    pub fn render(&self, record: &DimensionRecord, template: Option<&TemplateSource>) -> RenderOutcome {
        let compositor = self.compositor();
        let layout = compositor.layout(record);
        let content = layout.content;

        let mut degraded: Option<RenderError> = None;
        let vector = match template.and_then(|source| source.vector.as_deref()) {
            Some(path) => match load_vector(path, record) {
                Ok(geometry) => Some(geometry),
                Err(err) => {
                    warn!(record = %record.display_id(), path = %path.display(), error = %err, "矢量模板解析失败");
                    degraded = Some(err);
                    None
                }
            },
            None => None,
        };

        let raster_path = template.and_then(|source| source.raster.as_deref());
        let fit = match (raster_path, &vector) {
            (Some(path), _) => match self.load_raster(path) {
                Ok(raster) => {
                    TemplateFit::Fitted(fit_template(&raster, content, self.canvas.trim_border))
                }
                Err(err) => missing(record, err, content),
            },
            (None, Some(geometry)) if !geometry.paths.is_empty() => {
                let preview = render_wireframe(
                    geometry,
                    content.width,
                    content.height,
                    self.canvas.trim_border,
                );
                TemplateFit::Fitted(fit_template(&preview, content, self.canvas.trim_border))
            }
            (None, Some(_)) => {
                let cause = RenderError::DecodeFailure {
                    path: template
                        .and_then(|source| source.vector.clone())
                        .unwrap_or_default(),
                    message: "no usable entities".to_string(),
                };
                missing(record, cause, content)
            }
            (None, None) => {
                let cause = degraded.clone().unwrap_or_else(|| {
                    RenderError::MissingAsset(match &record.subshape {
                        Some(subshape) => format!("{}.{}", record.shape_name, subshape),
                        None => record.shape_name.clone(),
                    })
                });
                missing(record, cause, content)
            }
        };
        if let Some(cause) = fit.degradation() {
            degraded.get_or_insert_with(|| cause.clone());
        }

        let mode = FormulaMode::resolve(self.labels.anchor_mode, vector.is_some());
        let geometry = match (mode, vector) {
            (FormulaMode::Drawing, Some(geometry)) => Some(geometry),
            (FormulaMode::Drawing, None) => Some(extract_geometry(&Drawing::new(), record)),
            (FormulaMode::Pixel, _) => None,
        };
        let frame = AnchorFrame {
            canvas: layout.canvas,
            content,
            template_box: fit.rect(),
            margin: self.canvas.margin,
            tag_line_height: f64::from(compositor.line_height(FontTier::Tag)),
            view: geometry
                .as_ref()
                .map(|geometry| ViewTransform::fit(geometry, fit.content_box())),
        };
        let anchors = self.registry.compute_anchors(mode, record, &frame);
        debug!(record = %record.display_id(), ?mode, anchors = anchors.len(), "锚点计算完成");

        let mut image = compositor.blank_canvas();
        compositor.draw_template(&mut image, &fit);
        compositor.draw_title(&mut image, &layout);
        let labels = compositor.draw_labels(&mut image, &anchors);

        RenderOutcome {
            image,
            mode,
            anchors,
            labels,
            degraded,
        }
    }

    /// 渲染并以 PNG 写入 `output_dir`，目录不存在时创建。
    pub fn render_to_file(
        &self,
        record: &DimensionRecord,
        template: Option<&TemplateSource>,
        output_dir: &Path,
    ) -> Result<SavedRender, RenderError> {
        let outcome = self.render(record, template);
        let path = output_dir.join(format!("{}.png", sanitize_file_stem(&record.title())));
        fs::create_dir_all(output_dir).map_err(|err| RenderError::WriteFailure {
            path: output_dir.to_path_buf(),
            message: err.to_string(),
        })?;
        outcome
            .image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|err| RenderError::WriteFailure {
                path: path.clone(),
                message: err.to_string(),
            })?;
        debug!(record = %record.display_id(), path = %path.display(), "已写出图像");
        Ok(SavedRender {
            path,
            degraded: outcome.degraded,
        })
    }

    fn load_raster(&self, path: &Path) -> Result<RgbaImage, RenderError> {
        if !path.is_file() {
            return Err(RenderError::MissingAsset(path.display().to_string()));
        }
        let mut raster = image::open(path)
            .map_err(|err| RenderError::DecodeFailure {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
            .to_rgba8();
        if raster.width() == 0 || raster.height() == 0 {
            return Err(RenderError::DecodeFailure {
                path: path.to_path_buf(),
                message: "empty image".to_string(),
            });
        }
        let keyed = self.key_filter.apply(&mut raster);
        debug!(path = %path.display(), keyed, "背景键控完成");
        Ok(raster)
    }
}

fn load_vector(path: &Path, record: &DimensionRecord) -> Result<DrawingGeometry, RenderError> {
    let drawing = DxfFacade::new()
        .load(path)
        .map_err(|err| RenderError::DecodeFailure {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    let geometry = extract_geometry(&drawing, record);
    if !geometry.from_entities {
        warn!(record = %record.display_id(), path = %path.display(), "矢量模板没有可用实体，改用声明尺寸");
    }
    Ok(geometry)
}

fn missing(record: &DimensionRecord, cause: RenderError, content: PixelRect) -> TemplateFit {
    warn!(record = %record.display_id(), error = %cause, "模板不可用，绘制占位图");
    TemplateFit::Missing {
        cause,
        rect: content,
    }
}
