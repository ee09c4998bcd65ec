use secdraw_core::geometry::Point2;

use crate::extract::DrawingGeometry;

/// 图纸空间到画布像素的映射：等比缩放、居中、Y 轴翻转。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// 图纸左上角 (min_x, max_y)。
    origin: Point2,
    scale: f64,
    /// 图纸原点落在画布上的像素位置。
    offset: Point2,
}

impl ViewTransform {
    /// 把几何等比放入目标框 `(x, y, w, h)` 并居中。
    pub fn fit(geometry: &DrawingGeometry, target: (f64, f64, f64, f64)) -> Self {
        let (x, y, w, h) = target;
        let width = geometry.width();
        let height = geometry.height();
        let scale = (w / width).min(h / height).max(f64::MIN_POSITIVE);
        // 退化到 1 个单位的方向上，实际内容居中于该单位内
        let drawn_w = geometry.bounds.width().max(0.0) * scale;
        let drawn_h = geometry.bounds.height().max(0.0) * scale;
        Self {
            origin: geometry.top_left(),
            scale,
            offset: Point2::new(x + (w - drawn_w) / 2.0, y + (h - drawn_h) / 2.0),
        }
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_canvas(&self, point: Point2) -> Point2 {
        Point2::new(
            self.offset.x() + (point.x() - self.origin.x()) * self.scale,
            self.offset.y() + (self.origin.y() - point.y()) * self.scale,
        )
    }
}
