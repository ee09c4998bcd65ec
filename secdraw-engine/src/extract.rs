use std::f64::consts::{FRAC_PI_2, TAU};

use secdraw_core::drawing::{ArcSegment, Drawing, DrawingEntity};
use secdraw_core::geometry::{Bounds2D, Point2};
use secdraw_core::record::DimensionRecord;
use tracing::debug;

const CIRCLE_SEGMENTS: usize = 64;
const ARC_SEGMENT_ANGLE: f64 = TAU / 64.0;
const ANGLE_EPSILON: f64 = 1e-9;

/// 从矢量模板提取出的图纸空间几何。
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingGeometry {
    pub bounds: Bounds2D,
    pub points: Vec<Point2>,
    /// 每个参与实体的折线路径，线框预览使用。
    pub paths: Vec<Vec<Point2>>,
    pub centroid: Point2,
    /// 为 `false` 时边界框来自记录的声明尺寸。
    pub from_entities: bool,
}

impl DrawingGeometry {
    /// 零宽按 1 个图纸单位计。
    #[inline]
    pub fn width(&self) -> f64 {
        clamp_extent(self.bounds.width())
    }

    #[inline]
    pub fn height(&self) -> f64 {
        clamp_extent(self.bounds.height())
    }

    /// 图纸左上角（min_x, max_y），映射到画布时的原点。
    #[inline]
    pub fn top_left(&self) -> Point2 {
        Point2::new(self.bounds.min().x(), self.bounds.max().y())
    }
}

fn clamp_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

/// 参与几何提取的实体种类判定。
pub fn contributes(entity: &DrawingEntity) -> bool {
    match entity {
        DrawingEntity::Line { .. } => true,
        DrawingEntity::Polyline { vertices, .. } => !vertices.is_empty(),
        DrawingEntity::Arc(arc) => arc.radius > 0.0,
        DrawingEntity::Circle { radius, .. } => *radius > 0.0,
        DrawingEntity::Skipped { .. } => false,
    }
}

/// 收集所有参与实体的特征点与边界框；没有任何点时退回记录声明的尺寸。
pub fn extract_geometry(drawing: &Drawing, record: &DimensionRecord) -> DrawingGeometry {
    let mut points: Vec<Point2> = Vec::new();
    let mut paths: Vec<Vec<Point2>> = Vec::new();

    for entity in drawing.entities() {
        if !contributes(entity) {
            match entity {
                DrawingEntity::Skipped { kind, reason } => {
                    debug!(record = %record.display_id(), kind = %kind, reason = %reason, "跳过不参与提取的实体");
                }
                other => {
                    debug!(record = %record.display_id(), kind = other.kind_name(), "跳过退化实体");
                }
            }
            continue;
        }
        match entity {
            DrawingEntity::Line { start, end } => {
                points.extend([*start, *end]);
                paths.push(vec![*start, *end]);
            }
            DrawingEntity::Polyline {
                vertices,
                is_closed,
            } => {
                points.extend(vertices.iter().copied());
                let mut path = vertices.clone();
                if *is_closed && vertices.len() > 2 {
                    path.push(vertices[0]);
                }
                paths.push(path);
            }
            DrawingEntity::Arc(arc) => {
                points.extend(arc_feature_points(arc));
                paths.push(sample_arc(arc));
            }
            DrawingEntity::Circle { center, radius } => {
                points.extend(
                    [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)]
                        .map(|(dx, dy)| Point2::new(center.x() + dx * radius, center.y() + dy * radius)),
                );
                paths.push(sample_circle(*center, *radius));
            }
            DrawingEntity::Skipped { .. } => {}
        }
    }

    if points.is_empty() {
        let dims = &record.dimensions;
        let width = dims.wt.or(dims.wb).unwrap_or(1.0);
        let height = dims.hr.or(dims.h).unwrap_or(1.0);
        let bounds = Bounds2D::new(
            Point2::new(0.0, 0.0),
            Point2::new(clamp_extent(width), clamp_extent(height)),
        );
        debug!(record = %record.display_id(), width, height, "矢量源无可用点，使用声明尺寸");
        return DrawingGeometry {
            bounds,
            centroid: bounds.center(),
            points,
            paths,
            from_entities: false,
        };
    }

    let bounds = Bounds2D::from_points(points.iter());
    let sum = points
        .iter()
        .fold(glam::DVec2::ZERO, |acc, point| acc + point.as_vec2());
    let centroid = Point2::from_vec(sum / points.len() as f64);

    DrawingGeometry {
        bounds,
        points,
        paths,
        centroid,
        from_entities: true,
    }
}

/// 归一化后的逆时针扫掠区间 `(start, end)`：start 落在 `[0, 2π)`，end 在 `(start, start + 2π]`。
fn sweep(arc: &ArcSegment) -> (f64, f64) {
    let normalize = |angle: f64| if angle.is_finite() { angle.rem_euclid(TAU) } else { 0.0 };
    let start = normalize(arc.start_angle);
    let mut end = normalize(arc.end_angle);
    if end <= start {
        end += TAU;
    }
    (start, end)
}

fn point_on_arc(arc: &ArcSegment, angle: f64) -> Point2 {
    Point2::new(
        arc.center.x() + arc.radius * angle.cos(),
        arc.center.y() + arc.radius * angle.sin(),
    )
}

/// 两个端点，加上扫掠范围内的坐标轴极值点。
fn arc_feature_points(arc: &ArcSegment) -> Vec<Point2> {
    let (start, end) = sweep(arc);
    let mut points = vec![point_on_arc(arc, start), point_on_arc(arc, end)];
    let mut index = (start / FRAC_PI_2).ceil() as i64;
    loop {
        let quadrant = index as f64 * FRAC_PI_2;
        if quadrant >= end - ANGLE_EPSILON {
            break;
        }
        if quadrant > start + ANGLE_EPSILON {
            points.push(point_on_arc(arc, quadrant));
        }
        index += 1;
    }
    points
}

fn sample_arc(arc: &ArcSegment) -> Vec<Point2> {
    let (start, end) = sweep(arc);
    let sweep = end - start;
    let segments = ((sweep / ARC_SEGMENT_ANGLE).ceil() as usize).max(2);
    (0..=segments)
        .map(|step| point_on_arc(arc, start + sweep * step as f64 / segments as f64))
        .collect()
}

fn sample_circle(center: Point2, radius: f64) -> Vec<Point2> {
    (0..=CIRCLE_SEGMENTS)
        .map(|step| {
            let angle = TAU * step as f64 / CIRCLE_SEGMENTS as f64;
            Point2::new(center.x() + radius * angle.cos(), center.y() + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use secdraw_core::record::{CoordinateShift, Dimensions, ShapeFamily};

    use super::*;

    fn record(wt: Option<f64>, hr: Option<f64>) -> DimensionRecord {
        DimensionRecord {
            row: 3,
            code: "B1".to_string(),
            section_name: "S".to_string(),
            shape: ShapeFamily::BoxBeam,
            shape_name: "Box Beam".to_string(),
            subshape: None,
            dimensions: Dimensions {
                wt,
                hr,
                ..Dimensions::default()
            },
            shift: CoordinateShift::default(),
        }
    }

    #[test]
    fn lines_and_polylines_define_bounds_and_centroid() {
        let mut drawing = Drawing::new();
        drawing.add_line(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        drawing.add_polyline([Point2::new(0.0, 2.0), Point2::new(4.0, 6.0)], false);

        let geometry = extract_geometry(&drawing, &record(None, None));
        assert!(geometry.from_entities);
        assert_eq!(geometry.points.len(), 4);
        assert_eq!(geometry.bounds.min(), Point2::new(0.0, 0.0));
        assert_eq!(geometry.bounds.max(), Point2::new(4.0, 6.0));
        assert_eq!(geometry.centroid, Point2::new(2.0, 2.0));
        assert_eq!(geometry.top_left(), Point2::new(0.0, 6.0));
        assert_eq!(geometry.paths.len(), 2);
    }

    #[test]
    fn skipped_entities_do_not_contribute() {
        let mut drawing = Drawing::new();
        drawing.add_entity(DrawingEntity::Skipped {
            kind: "TEXT".to_string(),
            reason: "unsupported".to_string(),
        });
        drawing.add_entity(DrawingEntity::Circle {
            center: Point2::new(1.0, 1.0),
            radius: 0.0,
        });
        drawing.add_line(Point2::new(-1.0, -2.0), Point2::new(3.0, 2.0));

        let geometry = extract_geometry(&drawing, &record(None, None));
        assert_eq!(geometry.points.len(), 2);
        assert!((geometry.width() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn arc_contributes_endpoints_and_axis_extremes() {
        let mut drawing = Drawing::new();
        drawing.add_entity(DrawingEntity::Arc(ArcSegment {
            center: Point2::new(0.0, 0.0),
            radius: 2.0,
            start_angle: 0.0,
            end_angle: PI,
        }));
        let geometry = extract_geometry(&drawing, &record(None, None));
        // 两个端点 + 90° 处的极值点
        assert_eq!(geometry.points.len(), 3);
        assert!((geometry.bounds.max().y() - 2.0).abs() < 1e-9);
        assert!(geometry.bounds.min().y().abs() < 1e-9);
        assert!((geometry.width() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn wrapping_arc_crosses_zero_angle() {
        let arc = ArcSegment {
            center: Point2::new(0.0, 0.0),
            radius: 1.0,
            start_angle: 1.5 * PI,
            end_angle: 0.5 * PI,
        };
        let points = arc_feature_points(&arc);
        // 起点、终点以及 0° 处的极值
        assert_eq!(points.len(), 3);
        assert!(points.iter().any(|p| (p.x() - 1.0).abs() < 1e-9 && p.y().abs() < 1e-9));
    }

    #[test]
    fn huge_arc_angles_are_normalised() {
        let source = "0\nSECTION\n2\nENTITIES\n0\nARC\n10\n0\n20\n0\n40\n1\n50\n1e20\n51\n0\n0\nENDSEC\n0\nEOF\n";
        let drawing = secdraw_io::DxfFacade::new().parse_str(source).expect("parse");
        let geometry = extract_geometry(&drawing, &record(None, None));
        assert!(geometry.from_entities);
        assert!(geometry.points.len() <= 6);
        assert!(geometry.points.iter().all(|p| p.x().is_finite() && p.y().is_finite()));
        assert!(geometry.bounds.max().x() <= 1.0 + 1e-9);
        assert!(geometry.bounds.min().y() >= -1.0 - 1e-9);

        let arc = ArcSegment {
            center: Point2::new(0.0, 0.0),
            radius: 1.0,
            start_angle: -1e300,
            end_angle: f64::MAX,
        };
        assert!(arc_feature_points(&arc).len() <= 6);
        assert!(sample_arc(&arc).len() > 2);
    }

    #[test]
    fn empty_source_falls_back_to_declared_size() {
        let geometry = extract_geometry(&Drawing::new(), &record(Some(12.0), Some(30.0)));
        assert!(!geometry.from_entities);
        assert_eq!(geometry.bounds.min(), Point2::new(0.0, 0.0));
        assert_eq!(geometry.bounds.max(), Point2::new(12.0, 30.0));
        assert_eq!(geometry.centroid, Point2::new(6.0, 15.0));

        let zero = extract_geometry(&Drawing::new(), &record(Some(0.0), None));
        assert_eq!(zero.bounds.max(), Point2::new(1.0, 1.0));
    }

    #[test]
    fn degenerate_extent_clamps_to_one_unit() {
        let mut drawing = Drawing::new();
        drawing.add_line(Point2::new(2.0, 5.0), Point2::new(2.0, 9.0));
        let geometry = extract_geometry(&drawing, &record(None, None));
        assert_eq!(geometry.width(), 1.0);
        assert_eq!(geometry.height(), 4.0);
    }
}
