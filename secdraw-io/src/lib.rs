pub mod records;

use std::fs;
use std::path::Path;

use secdraw_core::drawing::{ArcSegment, Drawing, DrawingEntity};
use secdraw_core::geometry::Point2;
use thiserror::Error;

pub use records::{ParsedRow, RecordError, RecordTable};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid drawing structure: {0}")]
    InvalidDrawing(String),
    #[error("invalid record table {path:?}: {source}")]
    RecordTable {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 矢量模板加载入口。
pub trait DrawingLoader {
    fn load(&self, path: &Path) -> Result<Drawing, IoError>;
}

pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }

    /// 从内存中的 DXF 文本解析。
    pub fn parse_str(&self, source: &str) -> Result<Drawing, IoError> {
        DxfParser::new(source)
            .parse()
            .map_err(|err| IoError::InvalidDrawing(err.message()))
    }
}

impl Default for DxfFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingLoader for DxfFacade {
    fn load(&self, path: &Path) -> Result<Drawing, IoError> {
        // DXF 允许非 UTF-8 代码页，这里宽松解码，坐标只含 ASCII。
        let bytes = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let data = String::from_utf8_lossy(&bytes);
        self.parse_str(&data)
    }
}

#[derive(Debug)]
enum DxfError {
    /// 组码/值行本身无法读取，整个文件不可信。
    Syntax { message: String },
    /// 单个实体的字段不完整或无法解析，可跳过该实体。
    Invalid { message: String },
    /// 实体已完整读取，但不属于几何提取关心的形式。
    Unsupported { feature: String },
}

impl DxfError {
    fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    fn message(self) -> String {
        match self {
            DxfError::Syntax { message } | DxfError::Invalid { message } => message,
            DxfError::Unsupported { feature } => feature,
        }
    }
}

struct DxfParser<'a> {
    reader: DxfReader<'a>,
}

impl<'a> DxfParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: DxfReader::new(source),
        }
    }

    fn parse(mut self) -> Result<Drawing, DxfError> {
        let mut drawing = Drawing::new();
        while let Some((code, value)) = self.reader.next_pair()? {
            if code != 0 {
                return Err(DxfError::syntax(format!(
                    "意外的组码 {code}（期望 0 表示 SECTION/EOF）"
                )));
            }
            match value.trim() {
                "SECTION" => {
                    let (name_code, name) = self
                        .reader
                        .next_pair()?
                        .ok_or_else(|| DxfError::syntax("SECTION 缺少名称（组码 2）"))?;
                    if name_code != 2 {
                        return Err(DxfError::syntax(format!(
                            "SECTION 名称使用了组码 {name_code}（期望 2）"
                        )));
                    }
                    match name.trim() {
                        "ENTITIES" => self.parse_entities(&mut drawing)?,
                        _ => self.skip_section()?,
                    }
                }
                "EOF" => break,
                unexpected => {
                    return Err(DxfError::syntax(format!(
                        "意外的标记 {unexpected}，期望 SECTION 或 EOF"
                    )));
                }
            }
        }
        Ok(drawing)
    }

    fn skip_section(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value.trim() == "ENDSEC" => break,
                Some(_) => continue,
                None => {
                    return Err(DxfError::syntax("SECTION 未找到 ENDSEC 终止标记"));
                }
            }
        }
        Ok(())
    }

    fn parse_entities(&mut self, drawing: &mut Drawing) -> Result<(), DxfError> {
        loop {
            let (code, value) = match self.reader.next_pair()? {
                Some(pair) => pair,
                None => return Err(DxfError::syntax("ENTITIES 段提前结束")),
            };
            if code != 0 {
                return Err(DxfError::syntax(format!(
                    "ENTITIES 段遇到组码 {code}（期望 0 表示实体起始）"
                )));
            }

            let kind = value.trim().to_string();
            let parsed = match kind.as_str() {
                "ENDSEC" => break,
                "SEQEND" | "VERTEX" => {
                    // 游离的序列记录（通常来自被跳过的 POLYLINE），直接丢弃
                    self.skip_entity_body()?;
                    continue;
                }
                "LINE" => self.parse_line(),
                "LWPOLYLINE" => self.parse_lwpolyline(),
                "POLYLINE" => self.parse_polyline(),
                "ARC" => self.parse_arc(),
                "CIRCLE" => self.parse_circle(),
                _ => {
                    self.skip_entity_body()?;
                    Err(DxfError::unsupported(format!("暂不支持的实体类型 {kind}")))
                }
            };

            match parsed {
                Ok(entity) => drawing.add_entity(entity),
                Err(DxfError::Unsupported { feature }) => {
                    drawing.add_entity(DrawingEntity::Skipped {
                        kind,
                        reason: feature,
                    });
                }
                Err(DxfError::Invalid { message }) => {
                    self.skip_entity_body()?;
                    drawing.add_entity(DrawingEntity::Skipped {
                        kind,
                        reason: message,
                    });
                }
                Err(err @ DxfError::Syntax { .. }) => return Err(err),
            }
        }
        Ok(())
    }

    fn parse_line(&mut self) -> Result<DrawingEntity, DxfError> {
        let mut start_x = None;
        let mut start_y = None;
        let mut end_x = None;
        let mut end_y = None;
        while let Some((code, value)) = self.next_field()? {
            match code {
                10 => assign_coord(&mut start_x, &value, "LINE 起点 X")?,
                20 => assign_coord(&mut start_y, &value, "LINE 起点 Y")?,
                11 => assign_coord(&mut end_x, &value, "LINE 终点 X")?,
                21 => assign_coord(&mut end_y, &value, "LINE 终点 Y")?,
                _ => {}
            }
        }

        let sx = start_x.ok_or_else(|| DxfError::invalid("LINE 缺少起点 X（组码 10）"))?;
        let sy = start_y.ok_or_else(|| DxfError::invalid("LINE 缺少起点 Y（组码 20）"))?;
        let ex = end_x.ok_or_else(|| DxfError::invalid("LINE 缺少终点 X（组码 11）"))?;
        let ey = end_y.ok_or_else(|| DxfError::invalid("LINE 缺少终点 Y（组码 21）"))?;

        Ok(DrawingEntity::Line {
            start: Point2::new(sx, sy),
            end: Point2::new(ex, ey),
        })
    }

    fn parse_circle(&mut self) -> Result<DrawingEntity, DxfError> {
        let mut center_x = None;
        let mut center_y = None;
        let mut radius = None;
        while let Some((code, value)) = self.next_field()? {
            match code {
                10 => assign_coord(&mut center_x, &value, "CIRCLE 圆心 X")?,
                20 => assign_coord(&mut center_y, &value, "CIRCLE 圆心 Y")?,
                40 => assign_coord(&mut radius, &value, "CIRCLE 半径")?,
                _ => {}
            }
        }

        let cx = center_x.ok_or_else(|| DxfError::invalid("CIRCLE 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::invalid("CIRCLE 缺少圆心 Y（组码 20）"))?;
        let radius = radius.ok_or_else(|| DxfError::invalid("CIRCLE 缺少半径（组码 40）"))?;

        Ok(DrawingEntity::Circle {
            center: Point2::new(cx, cy),
            radius: radius.abs(),
        })
    }

    fn parse_arc(&mut self) -> Result<DrawingEntity, DxfError> {
        let mut center_x = None;
        let mut center_y = None;
        let mut radius = None;
        let mut start_angle = None;
        let mut end_angle = None;
        while let Some((code, value)) = self.next_field()? {
            match code {
                10 => assign_coord(&mut center_x, &value, "ARC 圆心 X")?,
                20 => assign_coord(&mut center_y, &value, "ARC 圆心 Y")?,
                40 => assign_coord(&mut radius, &value, "ARC 半径")?,
                50 => assign_coord(&mut start_angle, &value, "ARC 起始角")?,
                51 => assign_coord(&mut end_angle, &value, "ARC 终止角")?,
                _ => {}
            }
        }

        let cx = center_x.ok_or_else(|| DxfError::invalid("ARC 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::invalid("ARC 缺少圆心 Y（组码 20）"))?;
        let radius = radius.ok_or_else(|| DxfError::invalid("ARC 缺少半径（组码 40）"))?;
        let start_angle =
            start_angle.ok_or_else(|| DxfError::invalid("ARC 缺少起始角（组码 50）"))?;
        let end_angle = end_angle.ok_or_else(|| DxfError::invalid("ARC 缺少终止角（组码 51）"))?;

        Ok(DrawingEntity::Arc(ArcSegment {
            center: Point2::new(cx, cy),
            radius: radius.abs(),
            start_angle: start_angle.to_radians(),
            end_angle: end_angle.to_radians(),
        }))
    }

    fn parse_lwpolyline(&mut self) -> Result<DrawingEntity, DxfError> {
        let mut is_closed = false;
        let mut vertices: Vec<Point2> = Vec::new();
        let mut pending_x: Option<f64> = None;
        let mut pending_y: Option<f64> = None;
        while let Some((code, value)) = self.next_field()? {
            match code {
                70 => {
                    let flag = parse_i32(&value, "LWPOLYLINE 标志")?;
                    is_closed = flag & 0x01 == 0x01;
                }
                10 => {
                    let x = parse_f64(&value, "LWPOLYLINE 顶点 X")?;
                    if let Some(y) = pending_y.take() {
                        vertices.push(Point2::new(x, y));
                    } else if pending_x.replace(x).is_some() {
                        return Err(DxfError::invalid("LWPOLYLINE 顶点缺少对应的 Y（组码 20）"));
                    }
                }
                20 => {
                    let y = parse_f64(&value, "LWPOLYLINE 顶点 Y")?;
                    if let Some(x) = pending_x.take() {
                        vertices.push(Point2::new(x, y));
                    } else if pending_y.replace(y).is_some() {
                        return Err(DxfError::invalid("LWPOLYLINE 顶点缺少对应的 X（组码 10）"));
                    }
                }
                _ => {}
            }
        }

        if pending_x.is_some() || pending_y.is_some() {
            return Err(DxfError::invalid(
                "LWPOLYLINE 顶点坐标成对出现（组码 10/20），检测到不完整的顶点",
            ));
        }
        if vertices.is_empty() {
            return Err(DxfError::invalid("LWPOLYLINE 未解析到任何顶点"));
        }

        Ok(DrawingEntity::Polyline {
            vertices,
            is_closed,
        })
    }

    /// 旧式 POLYLINE：头部之后是 VERTEX 序列，以 SEQEND 结束。
    fn parse_polyline(&mut self) -> Result<DrawingEntity, DxfError> {
        let mut flags: i32 = 0;
        while let Some((code, value)) = self.next_field()? {
            if code == 70 {
                flags = parse_i32(&value, "POLYLINE 标志（组码 70）")?;
            }
        }

        let mut vertices: Vec<Point2> = Vec::new();
        let mut vertex_error: Option<DxfError> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => match value.trim() {
                    "VERTEX" => match self.parse_vertex() {
                        Ok(Some(point)) => vertices.push(point),
                        Ok(None) => {}
                        Err(DxfError::Invalid { message }) => {
                            self.skip_entity_body()?;
                            vertex_error.get_or_insert(DxfError::invalid(message));
                        }
                        Err(err) => return Err(err),
                    },
                    "SEQEND" => {
                        self.skip_entity_body()?;
                        break;
                    }
                    _ => {
                        // 缺少 SEQEND 时容忍，交回上层继续解析
                        self.reader.put_back((0, value));
                        break;
                    }
                },
                Some(_) => {
                    return Err(DxfError::syntax(
                        "POLYLINE 遇到无效的记录，期望 VERTEX/SEQEND",
                    ));
                }
                None => return Err(DxfError::syntax("POLYLINE 缺少 SEQEND")),
            }
        }

        if flags & (0x10 | 0x40) != 0 {
            return Err(DxfError::unsupported("POLYLINE 网格/多面网格不参与截面几何"));
        }
        if let Some(DxfError::Invalid { message }) = vertex_error {
            // 序列已读完，返回 Unsupported 以免上层再次跳过实体体
            return Err(DxfError::unsupported(message));
        }
        if vertices.is_empty() {
            return Err(DxfError::unsupported("POLYLINE 未解析到任何顶点"));
        }

        Ok(DrawingEntity::Polyline {
            vertices,
            is_closed: flags & 0x01 == 0x01,
        })
    }

    fn parse_vertex(&mut self) -> Result<Option<Point2>, DxfError> {
        let mut x = None;
        let mut y = None;
        let mut flags: i32 = 0;
        while let Some((code, value)) = self.next_field()? {
            match code {
                10 => assign_coord(&mut x, &value, "VERTEX X")?,
                20 => assign_coord(&mut y, &value, "VERTEX Y")?,
                70 => flags = parse_i32(&value, "VERTEX 标志（组码 70）")?,
                _ => {}
            }
        }
        // 0x80 为多面网格的面记录，不是坐标点
        if flags & 0x80 != 0 && flags & 0x40 == 0 {
            return Ok(None);
        }
        match (x, y) {
            (Some(x), Some(y)) => Ok(Some(Point2::new(x, y))),
            _ => Err(DxfError::invalid("VERTEX 缺少完整的 XY 坐标")),
        }
    }

    /// 读取当前实体的下一个字段；遇到组码 0 时回退并返回 `None`。
    fn next_field(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        match self.reader.next_pair()? {
            Some((0, value)) => {
                self.reader.put_back((0, value));
                Ok(None)
            }
            Some(pair) => Ok(Some(pair)),
            None => Err(DxfError::invalid("实体未正确结束")),
        }
    }

    fn skip_entity_body(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }
}

struct DxfReader<'a> {
    lines: std::str::Lines<'a>,
    buffer: Option<(i32, String)>,
    line_number: usize,
}

impl<'a> DxfReader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            buffer: None,
            line_number: 0,
        }
    }

    fn next_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        if let Some(pair) = self.buffer.take() {
            return Ok(Some(pair));
        }

        let code_line = loop {
            match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    // 文件末尾的空行不算作组码
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Ok(None),
            }
        };

        let value_line = match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line
            }
            None => {
                return Err(DxfError::syntax(format!(
                    "文件在第 {} 行结束，缺少与组码对应的值行",
                    self.line_number
                )));
            }
        };

        let code = code_line.trim().parse::<i32>().map_err(|_| {
            DxfError::syntax(format!(
                "第 {} 行的组码 \"{}\" 无法解析为整数",
                self.line_number - 1,
                code_line.trim()
            ))
        })?;
        let value = value_line.trim_end_matches('\r').to_string();
        Ok(Some((code, value)))
    }

    fn put_back(&mut self, pair: (i32, String)) {
        debug_assert!(self.buffer.is_none(), "DXF pair 只能回退一次");
        self.buffer = Some(pair);
    }
}

fn assign_coord(slot: &mut Option<f64>, raw: &str, context: &str) -> Result<(), DxfError> {
    if slot.is_some() {
        return Err(DxfError::invalid(format!("{context} 出现重复值")));
    }
    *slot = Some(parse_f64(raw, context)?);
    Ok(())
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))?;
    if !value.is_finite() {
        return Err(DxfError::invalid(format!("{context} 不是有限数（值：\"{raw}\"）")));
    }
    Ok(value)
}

fn parse_i32(raw: &str, context: &str) -> Result<i32, DxfError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}
