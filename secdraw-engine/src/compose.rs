use image::imageops;
use image::{Rgba, RgbaImage};
use secdraw_config::{CanvasConfig, LabelConfig};
use secdraw_core::geometry::PixelRect;
use secdraw_core::label::{Anchor, FontTier, HorizontalAlign, LabelKey, VerticalAlign};
use secdraw_core::record::DimensionRecord;
use tracing::warn;

use crate::errors::RenderError;
use crate::fit::TemplateFit;
use crate::text::{TextRenderer, wrap_title};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const RED: Rgba<u8> = Rgba([200, 0, 0, 255]);
const PLACEHOLDER_FRAME: Rgba<u8> = Rgba([180, 180, 180, 255]);

/// 单条记录的画布布局：顶部标题区 + 内容区。
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasLayout {
    pub canvas: PixelRect,
    pub title_lines: Vec<String>,
    pub title_line_height: u32,
    pub content: PixelRect,
}

/// 已绘制标注的位置，便于检查与调试。
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub key: LabelKey,
    pub text: String,
    pub rect: PixelRect,
}

pub struct Compositor<'a> {
    canvas: &'a CanvasConfig,
    labels: &'a LabelConfig,
    text: &'a TextRenderer,
}

impl<'a> Compositor<'a> {
    pub fn new(canvas: &'a CanvasConfig, labels: &'a LabelConfig, text: &'a TextRenderer) -> Self {
        Self {
            canvas,
            labels,
            text,
        }
    }

    pub fn font_size(&self, tier: FontTier) -> f32 {
        match tier {
            FontTier::Title => self.canvas.title_font_size,
            FontTier::Dimension => self.canvas.dimension_font_size,
            FontTier::Thickness => self.canvas.thickness_font_size,
            FontTier::Tag => self.canvas.tag_font_size,
        }
    }

    /// 一行文字的高度（像素）。
    pub fn line_height(&self, tier: FontTier) -> u32 {
        self.text.measure("Hg", self.font_size(tier)).height.max(1)
    }

    /// 按标题行数划分标题区与内容区。标题过高时内容区压缩到 1 px。
    pub fn layout(&self, record: &DimensionRecord) -> CanvasLayout {
        let cfg = self.canvas;
        let canvas = PixelRect::new(0, 0, cfg.output_width, cfg.output_height);
        let title_lines = wrap_title(
            &record.title(),
            cfg.title_max_lines,
            cfg.title_max_line_chars,
            cfg.title_overflow,
        );
        let line_height = self.line_height(FontTier::Title);
        let lines = title_lines.len() as u64;
        let title_bottom = u64::from(cfg.title_top_margin)
            + lines * u64::from(line_height)
            + lines.saturating_sub(1) * u64::from(cfg.title_gap);

        let margin = u64::from(cfg.margin);
        let height = u64::from(cfg.output_height);
        let content_top = (title_bottom + margin).max(margin);
        let available = height.saturating_sub(content_top + margin);
        let (content_top, content_height) = if available == 0 {
            warn!(record = %record.display_id(), lines, "标题占满画布，内容区压缩为 1 px");
            (content_top.min(height.saturating_sub(1)), 1)
        } else {
            (content_top, available)
        };

        CanvasLayout {
            canvas,
            title_lines,
            title_line_height: line_height,
            content: PixelRect::new(
                i64::from(cfg.margin),
                content_top as i64,
                cfg.output_width - 2 * cfg.margin,
                u32::try_from(content_height).unwrap_or(u32::MAX),
            ),
        }
    }

    /// 白色不透明底的空画布。
    pub fn blank_canvas(&self) -> RgbaImage {
        RgbaImage::from_pixel(self.canvas.output_width, self.canvas.output_height, WHITE)
    }

    pub fn draw_title(&self, canvas: &mut RgbaImage, layout: &CanvasLayout) {
        let size = self.font_size(FontTier::Title);
        let mut y = i64::from(self.canvas.title_top_margin);
        for line in &layout.title_lines {
            let measured = self.text.measure(line, size);
            let x = (i64::from(layout.canvas.width) - i64::from(measured.width)) / 2;
            self.text.draw(canvas, line, size, x.max(0), y, BLACK);
            y += i64::from(layout.title_line_height) + i64::from(self.canvas.title_gap);
        }
    }

    /// 绘制适配后的模板；缺失时在内容区绘制占位框与提示文字。
    pub fn draw_template(&self, canvas: &mut RgbaImage, fit: &TemplateFit) {
        match fit {
            TemplateFit::Fitted(fitted) => {
                imageops::overlay(canvas, &fitted.image, fitted.rect.x, fitted.rect.y);
            }
            TemplateFit::Missing { cause, rect } => {
                stroke_rect(canvas, *rect, PLACEHOLDER_FRAME);
                let message = match cause {
                    RenderError::DecodeFailure { .. } => "Template open error",
                    _ => "Template not found",
                };
                let size = self.font_size(FontTier::Dimension);
                let measured = self.text.measure(message, size);
                let center = rect.center();
                let x = center.x() as i64 - i64::from(measured.width) / 2;
                let y = center.y() as i64 - i64::from(measured.height) / 2;
                self.text.draw(canvas, message, size, x, y, RED);
            }
        }
    }

    /// 逐个绘制带白底的标注，返回各标注最终所在的矩形。
    pub fn draw_labels(&self, canvas: &mut RgbaImage, anchors: &[Anchor]) -> Vec<PlacedLabel> {
        let mut placed = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            if anchor.key == LabelKey::SectionTitle && !self.labels.draw_section_anchor {
                continue;
            }
            let text = anchor.text(self.labels.show_prefix);
            if text.is_empty() {
                continue;
            }
            let size = self.font_size(anchor.tier);
            let measured = self.text.measure(&text, size);
            let pad_x = self.canvas.label_padding_x;
            let pad_y = self.canvas.label_padding_y;
            let box_w = measured.width.saturating_add(pad_x.saturating_mul(2));
            let box_h = measured.height.saturating_add(pad_y.saturating_mul(2));

            let ax = anchor.position.x().round() as i64;
            let ay = anchor.position.y().round() as i64;
            let x = match anchor.h_align {
                HorizontalAlign::Left => ax,
                HorizontalAlign::Center => ax - i64::from(box_w) / 2,
                HorizontalAlign::Right => ax - i64::from(box_w),
            };
            let y = match anchor.v_align {
                VerticalAlign::Top => ay,
                VerticalAlign::Center => ay - i64::from(box_h) / 2,
                VerticalAlign::Bottom => ay - i64::from(box_h),
            };
            let rect = clamp_into(
                PixelRect::new(x, y, box_w, box_h),
                canvas.width(),
                canvas.height(),
            );

            fill_rect(canvas, rect, WHITE);
            self.text.draw(
                canvas,
                &text,
                size,
                rect.x + i64::from(pad_x),
                rect.y + i64::from(pad_y),
                BLACK,
            );
            placed.push(PlacedLabel {
                key: anchor.key,
                text,
                rect,
            });
        }
        placed
    }
}

/// 把矩形平移进画布；比画布还大时贴左上角。
fn clamp_into(rect: PixelRect, width: u32, height: u32) -> PixelRect {
    let max_x = (i64::from(width) - i64::from(rect.width)).max(0);
    let max_y = (i64::from(height) - i64::from(rect.height)).max(0);
    PixelRect::new(rect.x.clamp(0, max_x), rect.y.clamp(0, max_y), rect.width, rect.height)
}

fn fill_rect(canvas: &mut RgbaImage, rect: PixelRect, color: Rgba<u8>) {
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = rect.right().min(i64::from(canvas.width()));
    let y1 = rect.bottom().min(i64::from(canvas.height()));
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn stroke_rect(canvas: &mut RgbaImage, rect: PixelRect, color: Rgba<u8>) {
    const WIDTH: u32 = 2;
    let w = rect.width.min(WIDTH);
    let h = rect.height.min(WIDTH);
    fill_rect(canvas, PixelRect::new(rect.x, rect.y, rect.width, h), color);
    fill_rect(canvas, PixelRect::new(rect.x, rect.bottom() - i64::from(h), rect.width, h), color);
    fill_rect(canvas, PixelRect::new(rect.x, rect.y, w, rect.height), color);
    fill_rect(canvas, PixelRect::new(rect.right() - i64::from(w), rect.y, w, rect.height), color);
}
