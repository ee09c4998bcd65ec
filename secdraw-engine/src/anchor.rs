//! 标注锚点计算。
//!
//! 每个形状族在每种模式下对应一条 [`AnchorFormula`]，统一登记在 [`FormulaRegistry`] 中；
//! 渲染流程只按 (模式, 形状族) 查表，不直接分支。

use std::collections::HashMap;

use secdraw_config::AnchorMode;
use secdraw_core::geometry::{PixelRect, Point2};
use secdraw_core::label::{
    Anchor, AnchorSpace, FontTier, HorizontalAlign, LabelKey, LabelValue, VerticalAlign,
};
use secdraw_core::record::{DimensionRecord, FamilyKind};

use crate::view::ViewTransform;

/// 图纸空间公式中的固定偏移（图纸单位）。
const SUBSHAPE_RAISE: f64 = 0.2;
const TITLE_RAISE: f64 = 0.4;

/// 像素比例公式中与模板框的间距（像素）。
const GAP_ABOVE: f64 = 6.0;
const GAP_BELOW: f64 = 6.0;
const GAP_RIGHT: f64 = 8.0;
const GAP_LEFT: f64 = 12.0;

/// 实际使用的公式空间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaMode {
    Drawing,
    Pixel,
}

impl FormulaMode {
    /// `auto` 在存在矢量几何时使用图纸空间公式。
    pub fn resolve(mode: AnchorMode, has_vector_geometry: bool) -> Self {
        match mode {
            AnchorMode::Auto if has_vector_geometry => FormulaMode::Drawing,
            AnchorMode::Auto => FormulaMode::Pixel,
            AnchorMode::Drawing => FormulaMode::Drawing,
            AnchorMode::Pixel => FormulaMode::Pixel,
        }
    }
}

/// 计算锚点所需的画布布局。
#[derive(Debug, Clone, Copy)]
pub struct AnchorFrame {
    pub canvas: PixelRect,
    pub content: PixelRect,
    /// 适配后的模板框或占位框。
    pub template_box: PixelRect,
    pub margin: u32,
    /// 子形状标签的一行高度（像素）。
    pub tag_line_height: f64,
    pub view: Option<ViewTransform>,
}

impl AnchorFrame {
    /// 把像素位置限制在画布内距边缘 `margin` 的范围。
    fn clamp_to_margin(&self, point: Point2) -> Point2 {
        let margin = f64::from(self.margin);
        let min_x = self.canvas.x as f64 + margin;
        let min_y = self.canvas.y as f64 + margin;
        let max_x = (self.canvas.right() as f64 - margin).max(min_x);
        let max_y = (self.canvas.bottom() as f64 - margin).max(min_y);
        Point2::new(point.x().clamp(min_x, max_x), point.y().clamp(min_y, max_y))
    }
}

pub trait AnchorFormula: Send + Sync {
    fn name(&self) -> &'static str;
    fn space(&self) -> AnchorSpace;
    fn compute(&self, record: &DimensionRecord, frame: &AnchorFrame) -> Vec<Anchor>;
}

pub struct FormulaRegistry {
    formulas: HashMap<(FormulaMode, FamilyKind), Box<dyn AnchorFormula>>,
}

const ALL_FAMILIES: [FamilyKind; 5] = [
    FamilyKind::BoxBeam,
    FamilyKind::StepBeam,
    FamilyKind::Brace,
    FamilyKind::Post,
    FamilyKind::Other,
];

impl FormulaRegistry {
    /// 空注册表。
    pub fn empty() -> Self {
        Self {
            formulas: HashMap::new(),
        }
    }

    /// 内置公式：所有形状族共用图纸空间公式；像素模式下 StepBeam 使用比例公式，其余使用外框偏移公式。
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for family in ALL_FAMILIES {
            registry.register(FormulaMode::Drawing, family, DrawingSpaceFormula);
            if family == FamilyKind::StepBeam {
                registry.register(FormulaMode::Pixel, family, StepBeamFractionFormula);
            } else {
                registry.register(FormulaMode::Pixel, family, FrameOffsetFormula);
            }
        }
        registry
    }

    pub fn register<F: AnchorFormula + 'static>(
        &mut self,
        mode: FormulaMode,
        family: FamilyKind,
        formula: F,
    ) {
        self.formulas.insert((mode, family), Box::new(formula));
    }

    pub fn resolve(&self, mode: FormulaMode, family: FamilyKind) -> Option<&dyn AnchorFormula> {
        self.formulas.get(&(mode, family)).map(|formula| formula.as_ref())
    }

    /// 计算并把图纸空间锚点映射到画布。未登记公式或缺少视图变换时返回空集。
    pub fn compute_anchors(
        &self,
        mode: FormulaMode,
        record: &DimensionRecord,
        frame: &AnchorFrame,
    ) -> Vec<Anchor> {
        let Some(formula) = self.resolve(mode, record.shape.kind()) else {
            return Vec::new();
        };
        let anchors = formula.compute(record, frame);
        match formula.space() {
            AnchorSpace::Canvas => anchors,
            AnchorSpace::Drawing => {
                let Some(view) = frame.view else {
                    return Vec::new();
                };
                anchors
                    .into_iter()
                    .map(|anchor| Anchor {
                        position: view.to_canvas(anchor.position),
                        space: AnchorSpace::Canvas,
                        ..anchor
                    })
                    .collect()
            }
        }
    }

    pub fn registered(&self) -> impl Iterator<Item = (&(FormulaMode, FamilyKind), &'static str)> {
        self.formulas.iter().map(|(key, formula)| (key, formula.name()))
    }
}

impl Default for FormulaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn number_anchor(
    key: LabelKey,
    value: f64,
    position: Point2,
    space: AnchorSpace,
    (h_align, v_align): (HorizontalAlign, VerticalAlign),
    tier: FontTier,
) -> Anchor {
    Anchor {
        key,
        position,
        space,
        h_align,
        v_align,
        tier,
        value: LabelValue::Number(value),
    }
}

fn bottom_slot_key(record: &DimensionRecord) -> LabelKey {
    if record.shape.uses_opening_width() {
        LabelKey::OpeningWidth
    } else {
        LabelKey::WidthBottom
    }
}

const CENTERED: (HorizontalAlign, VerticalAlign) = (HorizontalAlign::Center, VerticalAlign::Center);

/// 图纸空间公式。缺失值只省略自身标注；被其他标注位置引用的缺失值按约定回退。
pub struct DrawingSpaceFormula;

impl DrawingSpaceFormula {
    fn terms(record: &DimensionRecord) -> DrawingTerms {
        let dims = &record.dimensions;
        DrawingTerms {
            xl: record.shift.xl,
            yb: record.shift.yb,
            th: dims.thickness.unwrap_or(0.0),
            h: dims.h.unwrap_or(0.0),
            wt: dims.wt.unwrap_or(0.0),
            wb: dims.wb.or(dims.wt).unwrap_or(0.0),
            hr: dims.hr.or(dims.h).unwrap_or(0.0),
        }
    }
}

struct DrawingTerms {
    xl: f64,
    yb: f64,
    th: f64,
    h: f64,
    wt: f64,
    wb: f64,
    hr: f64,
}

impl DrawingTerms {
    fn thickness_y(&self) -> f64 {
        -self.yb + self.hr / 2.0
    }
}

impl AnchorFormula for DrawingSpaceFormula {
    fn name(&self) -> &'static str {
        "drawing_space"
    }

    fn space(&self) -> AnchorSpace {
        AnchorSpace::Drawing
    }

    fn compute(&self, record: &DimensionRecord, _frame: &AnchorFrame) -> Vec<Anchor> {
        let dims = &record.dimensions;
        let t = Self::terms(record);
        let space = AnchorSpace::Drawing;
        let mut anchors = Vec::new();

        if let Some(h) = dims.h {
            anchors.push(number_anchor(
                LabelKey::Height,
                h,
                Point2::new(-t.xl - 2.0 * t.th, h / 2.0 - t.yb),
                space,
                (HorizontalAlign::Right, VerticalAlign::Center),
                FontTier::Dimension,
            ));
        }
        if let Some(value) = record.bottom_slot_value() {
            anchors.push(number_anchor(
                bottom_slot_key(record),
                value,
                Point2::new(-t.xl + t.wb / 2.0, -t.yb - 2.0 * t.th),
                space,
                CENTERED,
                FontTier::Dimension,
            ));
        }
        if let Some(hr) = dims.hr {
            anchors.push(number_anchor(
                LabelKey::HeightOther,
                hr,
                Point2::new(-t.xl + t.wb + 2.0 * t.th, -t.yb + hr / 2.0),
                space,
                (HorizontalAlign::Left, VerticalAlign::Center),
                FontTier::Dimension,
            ));
        }
        if let Some(th) = dims.thickness {
            anchors.push(number_anchor(
                LabelKey::Thickness,
                th,
                Point2::new(0.0, t.thickness_y()),
                space,
                CENTERED,
                FontTier::Thickness,
            ));
        }
        if let Some(wt) = dims.wt {
            anchors.push(number_anchor(
                LabelKey::WidthTop,
                wt,
                Point2::new(-t.xl + wt / 2.0, t.h - t.yb + 2.0 * t.th),
                space,
                CENTERED,
                FontTier::Dimension,
            ));
        }
        if let Some(subshape) = &record.subshape {
            anchors.push(Anchor {
                key: LabelKey::Subshape,
                position: Point2::new(0.0, t.thickness_y() + SUBSHAPE_RAISE),
                space,
                h_align: HorizontalAlign::Center,
                v_align: VerticalAlign::Center,
                tier: FontTier::Tag,
                value: LabelValue::Text(subshape.clone()),
            });
        }
        anchors.push(Anchor {
            key: LabelKey::SectionTitle,
            position: Point2::new(-t.xl + t.wt / 2.0, t.h / 2.0 + TITLE_RAISE),
            space,
            h_align: HorizontalAlign::Center,
            v_align: VerticalAlign::Bottom,
            tier: FontTier::Title,
            value: LabelValue::Text(record.title()),
        });
        anchors
    }
}

/// 围绕模板框四周放置标注的像素公式，适用于除 StepBeam 外的形状族。
pub struct FrameOffsetFormula;

impl FrameOffsetFormula {
    fn push_frame_labels(
        record: &DimensionRecord,
        frame: &AnchorFrame,
        include_width_top_and_height: bool,
        anchors: &mut Vec<Anchor>,
    ) {
        let dims = &record.dimensions;
        let rect = frame.template_box;
        let center = rect.center();
        let space = AnchorSpace::Canvas;

        if let Some(th) = dims.thickness {
            anchors.push(number_anchor(
                LabelKey::Thickness,
                th,
                center,
                space,
                CENTERED,
                FontTier::Thickness,
            ));
        }
        if let Some(wt) = dims.wt.filter(|_| include_width_top_and_height) {
            let position = Point2::new(center.x(), rect.y as f64 - GAP_ABOVE);
            anchors.push(number_anchor(
                LabelKey::WidthTop,
                wt,
                frame.clamp_to_margin(position),
                space,
                (HorizontalAlign::Center, VerticalAlign::Bottom),
                FontTier::Dimension,
            ));
        }
        if let Some(hr) = dims.hr {
            let position = Point2::new(rect.right() as f64 + GAP_RIGHT, center.y());
            anchors.push(number_anchor(
                LabelKey::HeightOther,
                hr,
                frame.clamp_to_margin(position),
                space,
                (HorizontalAlign::Left, VerticalAlign::Center),
                FontTier::Dimension,
            ));
        }
        if let Some(value) = record.bottom_slot_value() {
            let position = Point2::new(center.x(), rect.bottom() as f64 + GAP_BELOW);
            anchors.push(number_anchor(
                bottom_slot_key(record),
                value,
                frame.clamp_to_margin(position),
                space,
                (HorizontalAlign::Center, VerticalAlign::Top),
                FontTier::Dimension,
            ));
        }
        if let Some(h) = dims.h.filter(|_| include_width_top_and_height) {
            let position = Point2::new(rect.x as f64 - GAP_LEFT, center.y());
            anchors.push(number_anchor(
                LabelKey::Height,
                h,
                frame.clamp_to_margin(position),
                space,
                (HorizontalAlign::Right, VerticalAlign::Center),
                FontTier::Dimension,
            ));
        }
        if let Some(subshape) = &record.subshape {
            anchors.push(Anchor {
                key: LabelKey::Subshape,
                position: Point2::new(center.x(), center.y() - frame.tag_line_height),
                space,
                h_align: HorizontalAlign::Center,
                v_align: VerticalAlign::Center,
                tier: FontTier::Tag,
                value: LabelValue::Text(subshape.clone()),
            });
        }
    }
}

impl AnchorFormula for FrameOffsetFormula {
    fn name(&self) -> &'static str {
        "frame_offset"
    }

    fn space(&self) -> AnchorSpace {
        AnchorSpace::Canvas
    }

    fn compute(&self, record: &DimensionRecord, frame: &AnchorFrame) -> Vec<Anchor> {
        let mut anchors = Vec::new();
        Self::push_frame_labels(record, frame, true, &mut anchors);
        anchors
    }
}

/// StepBeam 的像素比例公式：顶宽与高度按模板框比例定位，其余标注沿用框外偏移。
pub struct StepBeamFractionFormula;

impl AnchorFormula for StepBeamFractionFormula {
    fn name(&self) -> &'static str {
        "step_beam_fraction"
    }

    fn space(&self) -> AnchorSpace {
        AnchorSpace::Canvas
    }

    fn compute(&self, record: &DimensionRecord, frame: &AnchorFrame) -> Vec<Anchor> {
        let dims = &record.dimensions;
        let rect = frame.template_box;
        let mut anchors = Vec::new();
        if let Some(wt) = dims.wt {
            anchors.push(number_anchor(
                LabelKey::WidthTop,
                wt,
                rect.fraction(0.5, 0.25),
                AnchorSpace::Canvas,
                CENTERED,
                FontTier::Dimension,
            ));
        }
        if let Some(h) = dims.h {
            anchors.push(number_anchor(
                LabelKey::Height,
                h,
                rect.fraction(0.5, 0.75),
                AnchorSpace::Canvas,
                CENTERED,
                FontTier::Dimension,
            ));
        }
        FrameOffsetFormula::push_frame_labels(record, frame, false, &mut anchors);
        anchors
    }
}

#[cfg(test)]
mod tests {
    use secdraw_core::drawing::Drawing;
    use secdraw_core::record::{CoordinateShift, Dimensions, ShapeFamily};

    use super::*;
    use crate::extract::extract_geometry;

    fn scenario(shape: ShapeFamily) -> DimensionRecord {
        DimensionRecord {
            row: 1,
            code: "101".to_string(),
            section_name: "B-1".to_string(),
            shape_name: shape.to_string(),
            shape,
            subshape: None,
            dimensions: Dimensions {
                wt: Some(10.0),
                h: Some(20.0),
                wb: Some(8.0),
                hr: Some(15.0),
                thickness: Some(0.5),
                opening_width: Some(6.0),
            },
            shift: CoordinateShift::default(),
        }
    }

    fn frame() -> AnchorFrame {
        AnchorFrame {
            canvas: PixelRect::new(0, 0, 1800, 2400),
            content: PixelRect::new(60, 300, 1680, 2040),
            template_box: PixelRect::new(400, 800, 1000, 1000),
            margin: 60,
            tag_line_height: 120.0,
            view: None,
        }
    }

    fn find(anchors: &[Anchor], key: LabelKey) -> Option<&Anchor> {
        anchors.iter().find(|anchor| anchor.key == key)
    }

    fn drawing_anchors(record: &DimensionRecord) -> Vec<Anchor> {
        DrawingSpaceFormula.compute(record, &frame())
    }

    #[test]
    fn box_beam_scenario_positions() {
        let anchors = drawing_anchors(&scenario(ShapeFamily::BoxBeam));
        let thickness = find(&anchors, LabelKey::Thickness).expect("thickness");
        assert_eq!(thickness.position, Point2::new(0.0, 7.5));
        assert_eq!(thickness.tier, FontTier::Thickness);
        let top = find(&anchors, LabelKey::WidthTop).expect("width top");
        assert_eq!(top.position, Point2::new(5.0, 21.0));
        let height = find(&anchors, LabelKey::Height).expect("height");
        assert_eq!(height.position, Point2::new(-1.0, 10.0));
        assert_eq!(height.h_align, HorizontalAlign::Right);
        let bottom = find(&anchors, LabelKey::WidthBottom).expect("width bottom");
        assert_eq!(bottom.position, Point2::new(4.0, -1.0));
        let other = find(&anchors, LabelKey::HeightOther).expect("height other");
        assert_eq!(other.position, Point2::new(9.0, 7.5));
        assert_eq!(other.h_align, HorizontalAlign::Left);
        let title = find(&anchors, LabelKey::SectionTitle).expect("title");
        assert_eq!(title.position.x(), 5.0);
        assert!((title.position.y() - 10.4).abs() < 1e-12);
        assert_eq!(title.v_align, VerticalAlign::Bottom);
        assert!(find(&anchors, LabelKey::OpeningWidth).is_none());
    }

    #[test]
    fn coordinate_shift_moves_labels() {
        let mut record = scenario(ShapeFamily::BoxBeam);
        record.shift = CoordinateShift { xl: 2.0, yb: 1.0 };
        let anchors = drawing_anchors(&record);
        let top = find(&anchors, LabelKey::WidthTop).expect("width top");
        assert_eq!(top.position, Point2::new(3.0, 20.0));
        let height = find(&anchors, LabelKey::Height).expect("height");
        assert_eq!(height.position, Point2::new(-3.0, 9.0));
    }

    #[test]
    fn equal_widths_share_x_without_shift() {
        let mut record = scenario(ShapeFamily::BoxBeam);
        record.dimensions.wb = Some(10.0);
        let anchors = drawing_anchors(&record);
        let top = find(&anchors, LabelKey::WidthTop).expect("width top");
        let bottom = find(&anchors, LabelKey::WidthBottom).expect("width bottom");
        assert_eq!(top.position.x(), bottom.position.x());
    }

    #[test]
    fn missing_height_other_only_omits_its_label() {
        let full = drawing_anchors(&scenario(ShapeFamily::BoxBeam));
        let mut record = scenario(ShapeFamily::BoxBeam);
        record.dimensions.hr = None;
        let partial = drawing_anchors(&record);

        assert!(find(&partial, LabelKey::HeightOther).is_none());
        assert_eq!(partial.len(), full.len() - 1);
        for key in [LabelKey::Height, LabelKey::WidthBottom, LabelKey::WidthTop] {
            assert_eq!(find(&partial, key), find(&full, key));
        }
    }

    #[test]
    fn brace_and_post_show_opening_width_at_bottom_slot() {
        let box_anchors = drawing_anchors(&scenario(ShapeFamily::BoxBeam));
        let box_bottom = find(&box_anchors, LabelKey::WidthBottom).expect("width bottom");
        for shape in [ShapeFamily::Brace, ShapeFamily::Post] {
            let anchors = drawing_anchors(&scenario(shape));
            assert!(find(&anchors, LabelKey::WidthBottom).is_none());
            let opening = find(&anchors, LabelKey::OpeningWidth).expect("opening width");
            assert_eq!(opening.position, box_bottom.position);
            assert_eq!(opening.value, LabelValue::Number(6.0));
            assert_eq!(opening.text(true), "WO: 6.00");
        }
    }

    #[test]
    fn anchors_are_deterministic() {
        let record = scenario(ShapeFamily::StepBeam);
        let registry = FormulaRegistry::new();
        let first = registry.compute_anchors(FormulaMode::Pixel, &record, &frame());
        let second = registry.compute_anchors(FormulaMode::Pixel, &record, &frame());
        assert_eq!(first, second);
    }

    #[test]
    fn subshape_tag_sits_above_thickness() {
        let mut record = scenario(ShapeFamily::BoxBeam);
        record.subshape = Some("A".to_string());
        let anchors = drawing_anchors(&record);
        let tag = find(&anchors, LabelKey::Subshape).expect("subshape");
        assert!((tag.position.y() - 7.7).abs() < 1e-12);
        assert_eq!(tag.tier, FontTier::Tag);
        assert_eq!(tag.text(true), "A");
    }

    #[test]
    fn frame_offset_places_labels_around_box() {
        let anchors = FrameOffsetFormula.compute(&scenario(ShapeFamily::BoxBeam), &frame());
        let top = find(&anchors, LabelKey::WidthTop).expect("width top");
        assert_eq!(top.position, Point2::new(900.0, 794.0));
        assert_eq!(top.v_align, VerticalAlign::Bottom);
        let bottom = find(&anchors, LabelKey::WidthBottom).expect("width bottom");
        assert_eq!(bottom.position, Point2::new(900.0, 1806.0));
        let other = find(&anchors, LabelKey::HeightOther).expect("height other");
        assert_eq!(other.position, Point2::new(1408.0, 1300.0));
        let height = find(&anchors, LabelKey::Height).expect("height");
        assert_eq!(height.position, Point2::new(388.0, 1300.0));
        let thickness = find(&anchors, LabelKey::Thickness).expect("thickness");
        assert_eq!(thickness.position, Point2::new(900.0, 1300.0));
        assert!(find(&anchors, LabelKey::SectionTitle).is_none());
    }

    #[test]
    fn frame_offset_clamps_to_margin() {
        let mut frame = frame();
        frame.template_box = PixelRect::new(60, 60, 1680, 2280);
        let anchors = FrameOffsetFormula.compute(&scenario(ShapeFamily::BoxBeam), &frame);
        let top = find(&anchors, LabelKey::WidthTop).expect("width top");
        assert_eq!(top.position.y(), 60.0);
        let height = find(&anchors, LabelKey::Height).expect("height");
        assert_eq!(height.position.x(), 60.0);
        let other = find(&anchors, LabelKey::HeightOther).expect("height other");
        assert_eq!(other.position.x(), 1740.0);
    }

    #[test]
    fn step_beam_uses_box_fractions() {
        let registry = FormulaRegistry::new();
        let formula = registry
            .resolve(FormulaMode::Pixel, FamilyKind::StepBeam)
            .expect("step beam formula");
        assert_eq!(formula.name(), "step_beam_fraction");

        let anchors = formula.compute(&scenario(ShapeFamily::StepBeam), &frame());
        let top = find(&anchors, LabelKey::WidthTop).expect("width top");
        assert_eq!(top.position, Point2::new(900.0, 1050.0));
        assert_eq!(top.h_align, HorizontalAlign::Center);
        let height = find(&anchors, LabelKey::Height).expect("height");
        assert_eq!(height.position, Point2::new(900.0, 1550.0));
        assert_eq!(height.v_align, VerticalAlign::Center);
        let other = find(&anchors, LabelKey::HeightOther).expect("height other");
        assert_eq!(other.position, Point2::new(1408.0, 1300.0));
        assert_eq!(other.h_align, HorizontalAlign::Left);
        let bottom = find(&anchors, LabelKey::WidthBottom).expect("width bottom");
        assert_eq!(bottom.position, Point2::new(900.0, 1806.0));
        for key in [LabelKey::WidthTop, LabelKey::Height, LabelKey::HeightOther] {
            assert_eq!(anchors.iter().filter(|a| a.key == key).count(), 1, "{key:?} 应只出现一次");
        }
    }

    #[test]
    fn drawing_anchors_are_projected_onto_canvas() {
        let record = scenario(ShapeFamily::BoxBeam);
        let geometry = extract_geometry(&Drawing::new(), &record);
        let mut frame = frame();
        frame.view = Some(ViewTransform::fit(&geometry, (400.0, 800.0, 1000.0, 1000.0)));

        let registry = FormulaRegistry::new();
        let anchors = registry.compute_anchors(FormulaMode::Drawing, &record, &frame);
        assert!(anchors.iter().all(|a| a.space == AnchorSpace::Canvas));
        // 声明尺寸 10x15，缩放 66.67，居中于 1000 宽的框
        let thickness = find(&anchors, LabelKey::Thickness).expect("thickness");
        let expected = frame.view.map(|view| view.to_canvas(Point2::new(0.0, 7.5)));
        assert_eq!(Some(thickness.position), expected);

        frame.view = None;
        assert!(registry
            .compute_anchors(FormulaMode::Drawing, &record, &frame)
            .is_empty());
    }

    #[test]
    fn mode_resolution() {
        assert_eq!(FormulaMode::resolve(AnchorMode::Auto, true), FormulaMode::Drawing);
        assert_eq!(FormulaMode::resolve(AnchorMode::Auto, false), FormulaMode::Pixel);
        assert_eq!(FormulaMode::resolve(AnchorMode::Pixel, true), FormulaMode::Pixel);
        assert_eq!(FormulaMode::resolve(AnchorMode::Drawing, false), FormulaMode::Drawing);
        assert_eq!(FormulaRegistry::new().registered().count(), 10);
    }
}
