use image::{Rgba, RgbaImage};
use secdraw_core::geometry::Point2;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::warn;

use crate::extract::DrawingGeometry;
use crate::view::ViewTransform;

const STROKE_WIDTH: f32 = 2.0;

/// 把提取出的实体路径描成线框，作为只有矢量源时的模板图。
/// 线条外沿距图像四边 `border` 像素，与裁边保留的边距一致。
pub fn render_wireframe(geometry: &DrawingGeometry, width: u32, height: u32, border: u32) -> RgbaImage {
    let (width, height) = (width.max(1), height.max(1));
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        warn!(width, height, "线框画布分配失败");
        return RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    };

    let inset = f64::from(border) + f64::from(STROKE_WIDTH) / 2.0;
    let target_w = (f64::from(width) - 2.0 * inset).max(1.0);
    let target_h = (f64::from(height) - 2.0 * inset).max(1.0);
    let view = ViewTransform::fit(geometry, (inset, inset, target_w, target_h));

    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: STROKE_WIDTH,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    for path in &geometry.paths {
        let projected: Vec<Point2> = path.iter().map(|point| view.to_canvas(*point)).collect();
        match projected.as_slice() {
            [] => {}
            [single] => {
                let dot = PathBuilder::from_circle(
                    single.x() as f32,
                    single.y() as f32,
                    STROKE_WIDTH / 2.0,
                );
                if let Some(dot) = dot {
                    pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            [first, rest @ ..] => {
                let mut builder = PathBuilder::new();
                builder.move_to(first.x() as f32, first.y() as f32);
                for point in rest {
                    builder.line_to(point.x() as f32, point.y() as f32);
                }
                if let Some(outline) = builder.finish() {
                    pixmap.stroke_path(&outline, &paint, &stroke, Transform::identity(), None);
                }
            }
        }
    }

    // tiny-skia 存的是预乘 alpha，转回直通 alpha
    let mut image = RgbaImage::new(width, height);
    for (target, source) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = source.demultiply();
        *target = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}

#[cfg(test)]
mod tests {
    use secdraw_core::drawing::Drawing;
    use secdraw_core::record::{CoordinateShift, DimensionRecord, Dimensions, ShapeFamily};

    use super::*;
    use crate::extract::extract_geometry;
    use crate::fit::trim_transparent;

    fn square() -> DrawingGeometry {
        let mut drawing = Drawing::new();
        drawing.add_polyline(
            [
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            true,
        );
        let record = DimensionRecord {
            row: 1,
            code: "S".to_string(),
            section_name: "Square".to_string(),
            shape: ShapeFamily::Post,
            shape_name: "Post".to_string(),
            subshape: None,
            dimensions: Dimensions::default(),
            shift: CoordinateShift::default(),
        };
        extract_geometry(&drawing, &record)
    }

    #[test]
    fn outline_is_stroked_inside_border() {
        let image = render_wireframe(&square(), 140, 140, 20);
        // 正方形中心线位于 (21,21)-(119,119)，线宽 2 px
        for (x, y) in [(20, 70), (21, 70), (70, 20), (118, 70), (70, 119)] {
            let pixel = image.get_pixel(x, y).0;
            assert!(pixel[3] > 200, "({x}, {y}) = {pixel:?}");
            assert!(pixel[0] < 50);
        }
        assert_eq!(image.get_pixel(70, 70).0[3], 0);
        assert_eq!(image.get_pixel(5, 5).0[3], 0);
        assert_eq!(image.get_pixel(17, 70).0[3], 0);
    }

    #[test]
    fn single_point_path_leaves_a_dot() {
        let mut geometry = square();
        geometry.paths = vec![vec![Point2::new(5.0, 5.0)]];
        let image = render_wireframe(&geometry, 140, 140, 20);
        assert!(image.get_pixel(70, 70).0[3] > 0);
        assert_eq!(image.get_pixel(21, 21).0[3], 0);
    }

    #[test]
    fn trimmed_preview_keeps_requested_border() {
        let image = render_wireframe(&square(), 300, 140, 20);
        let trimmed = trim_transparent(&image, 20);
        assert!((trimmed.insets.left - 20.0).abs() <= 1.0);
        assert!((trimmed.insets.top - 20.0).abs() <= 1.0);
    }
}
