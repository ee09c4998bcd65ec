use image::imageops::{self, FilterType};
use image::RgbaImage;
use secdraw_core::geometry::PixelRect;

use crate::errors::RenderError;

/// 裁边后保留下来的边距（像素），四边可能因贴近图像边界而不等。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Insets {
    fn scaled(self, factor: f64) -> Self {
        Self {
            left: self.left * factor,
            top: self.top * factor,
            right: self.right * factor,
            bottom: self.bottom * factor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Trimmed {
    pub image: RgbaImage,
    pub insets: Insets,
}

/// 裁掉 alpha 为 0 的外围，保留 `border` 像素边距（不超出原图）。全透明图原样返回。
pub fn trim_transparent(image: &RgbaImage, border: u32) -> Trimmed {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] == 0 {
            continue;
        }
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if min_x == u32::MAX {
        return Trimmed {
            image: image.clone(),
            insets: Insets::default(),
        };
    }

    let left = min_x.saturating_sub(border);
    let top = min_y.saturating_sub(border);
    let right = max_x.saturating_add(border).min(image.width() - 1);
    let bottom = max_y.saturating_add(border).min(image.height() - 1);
    let cropped = imageops::crop_imm(image, left, top, right - left + 1, bottom - top + 1).to_image();

    Trimmed {
        image: cropped,
        insets: Insets {
            left: f64::from(min_x - left),
            top: f64::from(min_y - top),
            right: f64::from(right - max_x),
            bottom: f64::from(bottom - max_y),
        },
    }
}

/// 缩放并居中后的模板。
#[derive(Debug, Clone)]
pub struct FittedTemplate {
    pub image: RgbaImage,
    /// 模板在画布上的位置。
    pub rect: PixelRect,
    pub scale: f64,
    /// 已按 `scale` 缩放的保留边距。
    pub insets: Insets,
}

impl FittedTemplate {
    /// 去掉保留边距后的内容框 `(x, y, w, h)`；边距吃掉整个模板时退回模板框。
    pub fn content_box(&self) -> (f64, f64, f64, f64) {
        let rect = self.rect;
        let width = f64::from(rect.width) - self.insets.left - self.insets.right;
        let height = f64::from(rect.height) - self.insets.top - self.insets.bottom;
        if width <= 0.0 || height <= 0.0 {
            return (
                rect.x as f64,
                rect.y as f64,
                f64::from(rect.width),
                f64::from(rect.height),
            );
        }
        (
            rect.x as f64 + self.insets.left,
            rect.y as f64 + self.insets.top,
            width,
            height,
        )
    }
}

/// 模板适配结果：成功，或带原因的缺失哨兵（占位框为整个内容区）。
#[derive(Debug, Clone)]
pub enum TemplateFit {
    Fitted(FittedTemplate),
    Missing { cause: RenderError, rect: PixelRect },
}

impl TemplateFit {
    /// 模板（或占位框）在画布上的位置。
    pub fn rect(&self) -> PixelRect {
        match self {
            TemplateFit::Fitted(fitted) => fitted.rect,
            TemplateFit::Missing { rect, .. } => *rect,
        }
    }

    pub fn content_box(&self) -> (f64, f64, f64, f64) {
        match self {
            TemplateFit::Fitted(fitted) => fitted.content_box(),
            TemplateFit::Missing { rect, .. } => (
                rect.x as f64,
                rect.y as f64,
                f64::from(rect.width),
                f64::from(rect.height),
            ),
        }
    }

    pub fn degradation(&self) -> Option<&RenderError> {
        match self {
            TemplateFit::Fitted(_) => None,
            TemplateFit::Missing { cause, .. } => Some(cause),
        }
    }
}

/// 裁边、等比缩放（不放大）并在内容区内居中。
pub fn fit_template(image: &RgbaImage, content: PixelRect, border: u32) -> FittedTemplate {
    let trimmed = trim_transparent(image, border);
    let (width, height) = trimmed.image.dimensions();
    let scale = (f64::from(content.width) / f64::from(width))
        .min(f64::from(content.height) / f64::from(height))
        .min(1.0);

    let target_w = ((f64::from(width) * scale).floor() as u32).max(1);
    let target_h = ((f64::from(height) * scale).floor() as u32).max(1);
    let resized = if (target_w, target_h) == (width, height) {
        trimmed.image
    } else {
        imageops::resize(&trimmed.image, target_w, target_h, FilterType::Lanczos3)
    };

    let x = content.x + i64::from(content.width.saturating_sub(target_w) / 2);
    let y = content.y + i64::from(content.height.saturating_sub(target_h) / 2);

    FittedTemplate {
        image: resized,
        rect: PixelRect::new(x, y, target_w, target_h),
        scale,
        insets: trimmed.insets.scaled(scale),
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn image_with_block(width: u32, height: u32, block: (u32, u32, u32, u32)) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        let (bx, by, bw, bh) = block;
        for y in by..by + bh {
            for x in bx..bx + bw {
                image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        image
    }

    #[test]
    fn trim_keeps_border_around_content() {
        let image = image_with_block(200, 100, (50, 40, 10, 10));
        let trimmed = trim_transparent(&image, 20);
        assert_eq!(trimmed.image.dimensions(), (50, 50));
        assert_eq!(trimmed.insets.left, 20.0);
        assert_eq!(trimmed.insets.bottom, 20.0);
    }

    #[test]
    fn trim_border_is_clamped_to_image() {
        let image = image_with_block(100, 100, (5, 90, 10, 10));
        let trimmed = trim_transparent(&image, 20);
        assert_eq!(trimmed.image.dimensions(), (35, 30));
        assert_eq!(trimmed.insets.left, 5.0);
        assert_eq!(trimmed.insets.top, 20.0);
        assert_eq!(trimmed.insets.bottom, 0.0);
    }

    #[test]
    fn fully_transparent_image_is_not_trimmed() {
        let image = RgbaImage::from_pixel(30, 40, Rgba([255, 255, 255, 0]));
        let trimmed = trim_transparent(&image, 20);
        assert_eq!(trimmed.image.dimensions(), (30, 40));
        assert_eq!(trimmed.insets, Insets::default());
    }

    #[test]
    fn large_template_is_scaled_down_and_centred() {
        let image = image_with_block(400, 200, (0, 0, 400, 200));
        let content = PixelRect::new(10, 20, 100, 100);
        let fitted = fit_template(&image, content, 0);
        assert!((fitted.scale - 0.25).abs() < 1e-12);
        assert_eq!(fitted.rect, PixelRect::new(10, 45, 100, 50));
        assert_eq!(fitted.image.dimensions(), (100, 50));
        assert!(content.contains_rect(&fitted.rect));
    }

    #[test]
    fn small_template_is_never_enlarged() {
        let image = image_with_block(40, 20, (0, 0, 40, 20));
        let content = PixelRect::new(0, 0, 100, 100);
        let fitted = fit_template(&image, content, 0);
        assert_eq!(fitted.scale, 1.0);
        assert_eq!(fitted.rect, PixelRect::new(30, 40, 40, 20));
    }

    #[test]
    fn content_box_excludes_scaled_border() {
        let image = image_with_block(200, 200, (40, 40, 120, 120));
        let fitted = fit_template(&image, PixelRect::new(0, 0, 80, 80), 40);
        assert!((fitted.scale - 0.4).abs() < 1e-12);
        let (x, y, w, h) = fitted.content_box();
        assert!((x - 16.0).abs() < 1e-9);
        assert!((y - 16.0).abs() < 1e-9);
        assert!((w - 48.0).abs() < 1e-9);
        assert!((h - 48.0).abs() < 1e-9);
    }

    #[test]
    fn missing_sentinel_reports_content_region() {
        let rect = PixelRect::new(60, 300, 1680, 2040);
        let fit = TemplateFit::Missing {
            cause: RenderError::MissingAsset("Box Beam".to_string()),
            rect,
        };
        assert_eq!(fit.rect(), rect);
        assert!(fit.degradation().is_some_and(RenderError::is_degradation));
    }
}
