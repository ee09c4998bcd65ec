pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示。图纸空间与画布像素空间共用该类型。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 轴对齐边界框，用于估算图形的图纸空间范围。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        /// 由点集构造；点集为空时返回空边界框。
        pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Self {
            let mut bounds = Self::empty();
            for point in points {
                bounds.include_point(*point);
            }
            bounds
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }
    }

    /// 画布上的像素矩形，左上角为原点，Y 轴向下。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PixelRect {
        pub x: i64,
        pub y: i64,
        pub width: u32,
        pub height: u32,
    }

    impl PixelRect {
        #[inline]
        pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
            Self {
                x,
                y,
                width,
                height,
            }
        }

        #[inline]
        pub fn right(&self) -> i64 {
            self.x + i64::from(self.width)
        }

        #[inline]
        pub fn bottom(&self) -> i64 {
            self.y + i64::from(self.height)
        }

        #[inline]
        pub fn origin(&self) -> Point2 {
            Point2::new(self.x as f64, self.y as f64)
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            Point2::new(
                self.x as f64 + f64::from(self.width) / 2.0,
                self.y as f64 + f64::from(self.height) / 2.0,
            )
        }

        /// 相对自身宽高的比例位置，`(0.5, 0.5)` 即中心。
        #[inline]
        pub fn fraction(&self, fx: f64, fy: f64) -> Point2 {
            Point2::new(
                self.x as f64 + f64::from(self.width) * fx,
                self.y as f64 + f64::from(self.height) * fy,
            )
        }

        pub fn contains_rect(&self, other: &PixelRect) -> bool {
            other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom()
        }
    }
}

pub mod drawing {
    use serde::{Deserialize, Serialize};

    use crate::geometry::Point2;

    /// 圆弧实体，角度以弧度形式储存，遵循数学正方向。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ArcSegment {
        pub center: Point2,
        pub radius: f64,
        pub start_angle: f64,
        pub end_angle: f64,
    }

    /// 模板矢量源中的实体。仅保留参与几何提取的种类，其余记为 `Skipped`。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum DrawingEntity {
        Line { start: Point2, end: Point2 },
        Polyline { vertices: Vec<Point2>, is_closed: bool },
        Arc(ArcSegment),
        Circle { center: Point2, radius: f64 },
        /// 未识别或解析失败的实体，保留种类与原因以便记录日志。
        Skipped { kind: String, reason: String },
    }

    impl DrawingEntity {
        #[inline]
        pub fn kind_name(&self) -> &str {
            match self {
                DrawingEntity::Line { .. } => "LINE",
                DrawingEntity::Polyline { .. } => "POLYLINE",
                DrawingEntity::Arc(_) => "ARC",
                DrawingEntity::Circle { .. } => "CIRCLE",
                DrawingEntity::Skipped { kind, .. } => kind,
            }
        }
    }

    /// 已解析的矢量模板。
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Drawing {
        entities: Vec<DrawingEntity>,
    }

    impl Drawing {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_entity(&mut self, entity: DrawingEntity) {
            self.entities.push(entity);
        }

        pub fn add_line(&mut self, start: Point2, end: Point2) {
            self.add_entity(DrawingEntity::Line { start, end });
        }

        pub fn add_polyline(&mut self, vertices: impl IntoIterator<Item = Point2>, is_closed: bool) {
            self.add_entity(DrawingEntity::Polyline {
                vertices: vertices.into_iter().collect(),
                is_closed,
            });
        }

        pub fn entities(&self) -> impl Iterator<Item = &DrawingEntity> {
            self.entities.iter()
        }

        pub fn len(&self) -> usize {
            self.entities.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entities.is_empty()
        }
    }
}

pub mod record {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    /// 截面形状族，决定标注公式集与 WB/WO 替换规则。
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum ShapeFamily {
        BoxBeam,
        StepBeam,
        Brace,
        Post,
        Other(String),
    }

    /// 去掉载荷后的形状族标识，供公式注册表做键。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum FamilyKind {
        BoxBeam,
        StepBeam,
        Brace,
        Post,
        Other,
    }

    impl ShapeFamily {
        /// 大小写不敏感，忽略空格、`_` 与 `-`。空白输入返回 `None`。
        pub fn parse(raw: &str) -> Option<Self> {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            let normalized: String = trimmed
                .chars()
                .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
                .flat_map(char::to_lowercase)
                .collect();
            let family = match normalized.as_str() {
                "boxbeam" => ShapeFamily::BoxBeam,
                "stepbeam" => ShapeFamily::StepBeam,
                "brace" => ShapeFamily::Brace,
                "post" => ShapeFamily::Post,
                _ => ShapeFamily::Other(trimmed.to_string()),
            };
            Some(family)
        }

        #[inline]
        pub fn kind(&self) -> FamilyKind {
            match self {
                ShapeFamily::BoxBeam => FamilyKind::BoxBeam,
                ShapeFamily::StepBeam => FamilyKind::StepBeam,
                ShapeFamily::Brace => FamilyKind::Brace,
                ShapeFamily::Post => FamilyKind::Post,
                ShapeFamily::Other(_) => FamilyKind::Other,
            }
        }

        /// Brace/Post 的底宽位置改为显示开口宽度。
        #[inline]
        pub fn uses_opening_width(&self) -> bool {
            matches!(self, ShapeFamily::Brace | ShapeFamily::Post)
        }
    }

    impl fmt::Display for ShapeFamily {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ShapeFamily::BoxBeam => f.write_str("Box Beam"),
                ShapeFamily::StepBeam => f.write_str("Step Beam"),
                ShapeFamily::Brace => f.write_str("Brace"),
                ShapeFamily::Post => f.write_str("Post"),
                ShapeFamily::Other(name) => f.write_str(name),
            }
        }
    }

    /// 截面尺寸。`None` 表示缺失：对应标注整体省略，而不是按 0 绘制。
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct Dimensions {
        pub wt: Option<f64>,
        pub h: Option<f64>,
        pub wb: Option<f64>,
        pub hr: Option<f64>,
        pub thickness: Option<f64>,
        pub opening_width: Option<f64>,
    }

    /// 局部坐标平移 (XL, YB)。
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct CoordinateShift {
        pub xl: f64,
        pub yb: f64,
    }

    /// 数据表中的一行截面记录，构造后只读。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct DimensionRecord {
        /// 数据表中的行号（从 1 开始），仅用于诊断。
        pub row: usize,
        pub code: String,
        pub section_name: String,
        pub shape: ShapeFamily,
        /// 数据表中原样书写的形状名，模板查找使用。
        pub shape_name: String,
        pub subshape: Option<String>,
        pub dimensions: Dimensions,
        pub shift: CoordinateShift,
    }

    impl DimensionRecord {
        /// 诊断输出用的记录标识。
        pub fn display_id(&self) -> String {
            if self.code.is_empty() {
                format!("#{}", self.row)
            } else {
                format!("#{} {}", self.row, self.code)
            }
        }

        /// 标题与输出文件名共用的 `"{code} _ {section_name}"`。
        pub fn title(&self) -> String {
            format!("{} _ {}", self.code, self.section_name)
        }

        /// 底宽槽位绑定的数值：Brace/Post 取开口宽度，其余取 WB。
        pub fn bottom_slot_value(&self) -> Option<f64> {
            if self.shape.uses_opening_width() {
                self.dimensions.opening_width
            } else {
                self.dimensions.wb
            }
        }
    }
}

pub mod label {
    use serde::{Deserialize, Serialize};

    use crate::geometry::Point2;

    /// 标注键。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum LabelKey {
        Height,
        WidthBottom,
        OpeningWidth,
        HeightOther,
        Thickness,
        WidthTop,
        Subshape,
        SectionTitle,
    }

    impl LabelKey {
        pub fn prefix(self) -> Option<&'static str> {
            match self {
                LabelKey::Height => Some("H"),
                LabelKey::WidthBottom => Some("WB"),
                LabelKey::OpeningWidth => Some("WO"),
                LabelKey::HeightOther => Some("HR"),
                LabelKey::Thickness => Some("Th"),
                LabelKey::WidthTop => Some("WT"),
                LabelKey::Subshape | LabelKey::SectionTitle => None,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum HorizontalAlign {
        Left,
        Center,
        Right,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum VerticalAlign {
        Top,
        Center,
        Bottom,
    }

    /// 字号档位；具体字号由画布配置决定。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum FontTier {
        Title,
        Dimension,
        Thickness,
        Tag,
    }

    /// 锚点坐标所在空间。图纸空间需经视图变换才能落到画布。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum AnchorSpace {
        Drawing,
        Canvas,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum LabelValue {
        Number(f64),
        Text(String),
    }

    /// 一个标注的位置、对齐方式与字号档位。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Anchor {
        pub key: LabelKey,
        pub position: Point2,
        pub space: AnchorSpace,
        pub h_align: HorizontalAlign,
        pub v_align: VerticalAlign,
        pub tier: FontTier,
        pub value: LabelValue,
    }

    impl Anchor {
        /// 数值保留两位小数，可选带 `H:`/`WB:` 等前缀。
        pub fn text(&self, show_prefix: bool) -> String {
            match &self.value {
                LabelValue::Text(text) => text.clone(),
                LabelValue::Number(value) => match self.key.prefix() {
                    Some(prefix) if show_prefix => format!("{prefix}: {value:.2}"),
                    _ => format!("{value:.2}"),
                },
            }
        }
    }
}
