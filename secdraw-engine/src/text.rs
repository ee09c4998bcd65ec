use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use secdraw_config::TitleOverflow;
use tracing::{debug, warn};

/// 未配置字体时依次尝试的系统字体。
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// 无字体时的近似字宽（相对字号）。
const FALLBACK_ADVANCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSize {
    pub width: u32,
    pub height: u32,
}

/// 文字度量与栅格化。字体缺失时仍给出近似尺寸，但不绘制字形。
#[derive(Clone)]
pub struct TextRenderer {
    font: Option<Font<'static>>,
    source: Option<PathBuf>,
}

impl fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextRenderer")
            .field("has_font", &self.font.is_some())
            .field("source", &self.source)
            .finish()
    }
}

impl TextRenderer {
    /// 优先使用配置的字体，其次是系统字体列表。
    pub fn load(configured: Option<&Path>) -> Self {
        let candidates = configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));
        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match fs::read(&path) {
                Ok(data) => match Font::try_from_vec(data) {
                    Some(font) => {
                        debug!(path = %path.display(), "已加载字体");
                        return Self {
                            font: Some(font),
                            source: Some(path),
                        };
                    }
                    None => warn!(path = %path.display(), "字体文件无法解析"),
                },
                Err(err) => warn!(path = %path.display(), error = %err, "读取字体失败"),
            }
        }
        warn!("未找到可用字体，标注只绘制背景框");
        Self::without_font()
    }

    pub fn without_font() -> Self {
        Self {
            font: None,
            source: None,
        }
    }

    #[inline]
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn measure(&self, text: &str, size: f32) -> TextSize {
        let Some(font) = &self.font else {
            let chars = text.chars().count() as f32;
            return TextSize {
                width: (chars * size * FALLBACK_ADVANCE).ceil() as u32,
                height: size.ceil() as u32,
            };
        };
        let scale = Scale::uniform(size);
        let metrics = font.v_metrics(scale);
        let width = font
            .layout(text, scale, point(0.0, 0.0))
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .fold(0.0_f32, f32::max);
        TextSize {
            width: width.ceil() as u32,
            height: (metrics.ascent - metrics.descent).ceil() as u32,
        }
    }

    /// 以 `(x, y)` 为文字框左上角绘制，超出画布的部分被裁掉。
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, size: f32, x: i64, y: i64, color: Rgba<u8>) {
        let Some(font) = &self.font else {
            return;
        };
        let scale = Scale::uniform(size);
        let metrics = font.v_metrics(scale);
        let origin = point(x as f32, y as f32 + metrics.ascent);
        let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
        for glyph in font.layout(text, scale, origin) {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = i64::from(bounds.min.x) + i64::from(gx);
                let py = i64::from(bounds.min.y) + i64::from(gy);
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                blend(pixel, color, coverage);
            });
        }
    }
}

/// 按覆盖率把 `color` 叠加到像素上。
fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * f32::from(color.0[3]) / 255.0;
    if alpha <= 0.0 {
        return;
    }
    for channel in 0..3 {
        let src = f32::from(color.0[channel]);
        let dst = f32::from(pixel.0[channel]);
        pixel.0[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    let dst_alpha = f32::from(pixel.0[3]) / 255.0;
    pixel.0[3] = ((alpha + dst_alpha * (1.0 - alpha)) * 255.0).round() as u8;
}

/// 贪心按词换行，每行不超过 `max_chars` 个字符；超长单词独占一行不拆分。
/// 行数超出 `max_lines` 时按 `overflow` 处理。
pub fn wrap_title(
    text: &str,
    max_lines: usize,
    max_chars: usize,
    overflow: TitleOverflow,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if overflow == TitleOverflow::Ellipsis {
        if let Some(last) = lines.last_mut() {
            let keep = max_chars.saturating_sub(1).min(last.chars().count());
            let mut shortened: String = last.chars().take(keep).collect();
            shortened.truncate(shortened.trim_end().len());
            shortened.push('…');
            *last = shortened;
        }
    }
    lines
}
