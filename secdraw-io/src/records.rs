//! 截面记录表：读取由电子表格导出的 JSON 行数组，并逐行校验为 [`DimensionRecord`]。

use std::fs;
use std::path::Path;

use secdraw_core::record::{CoordinateShift, DimensionRecord, Dimensions, ShapeFamily};
use serde::Deserialize;
use thiserror::Error;

use crate::IoError;

/// 单行校验失败的原因。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("column `{column}` is not numeric: {value:?}")]
    NotNumeric { column: &'static str, value: String },
    #[error("column `{column}` must be a finite number, got {value}")]
    NotFinite { column: &'static str, value: f64 },
    #[error("column `{column}` must not be negative, got {value}")]
    Negative { column: &'static str, value: f64 },
    #[error("missing shape")]
    MissingShape,
}

/// 表格单元格：数字或文本，文本按需解析为数字。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Cell {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", *value as i64)
            }
            Cell::Number(value) => value.to_string(),
            Cell::Text(text) => text.trim().to_string(),
            Cell::Flag(flag) => flag.to_string(),
        }
    }

    fn as_number(&self, column: &'static str) -> Result<Option<f64>, RecordError> {
        let value = match self {
            Cell::Number(value) => *value,
            Cell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed.parse::<f64>().map_err(|_| RecordError::NotNumeric {
                    column,
                    value: trimmed.to_string(),
                })?
            }
            Cell::Flag(flag) => {
                return Err(RecordError::NotNumeric {
                    column,
                    value: flag.to_string(),
                });
            }
        };
        if !value.is_finite() {
            return Err(RecordError::NotFinite { column, value });
        }
        Ok(Some(value))
    }
}

/// 原始行，列名兼容表头写法与 snake_case。
#[derive(Debug, Default, Deserialize)]
struct RawRow {
    #[serde(default, alias = "Code", alias = "NCode")]
    code: Option<Cell>,
    #[serde(default, alias = "Section Name", alias = "section")]
    section_name: Option<Cell>,
    #[serde(default, alias = "Shape")]
    shape: Option<Cell>,
    #[serde(default, alias = "Subshape")]
    subshape: Option<Cell>,
    #[serde(default, rename = "WT", alias = "wt")]
    wt: Option<Cell>,
    #[serde(default, rename = "H", alias = "h")]
    h: Option<Cell>,
    #[serde(default, rename = "WB", alias = "wb")]
    wb: Option<Cell>,
    #[serde(default, rename = "HR", alias = "hr")]
    hr: Option<Cell>,
    #[serde(default, rename = "Thickness", alias = "thickness", alias = "TH")]
    thickness: Option<Cell>,
    #[serde(default, alias = "xl  =", alias = "xl", alias = "XL")]
    xl_shift: Option<Cell>,
    #[serde(default, alias = "yb  =", alias = "yb", alias = "YB")]
    yb_shift: Option<Cell>,
    #[serde(default, alias = "Brace Entering", alias = "WO")]
    opening_width: Option<Cell>,
}

fn text_of(cell: &Option<Cell>) -> String {
    cell.as_ref().map(Cell::as_text).unwrap_or_default()
}

fn dimension(cell: &Option<Cell>, column: &'static str) -> Result<Option<f64>, RecordError> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    match cell.as_number(column)? {
        Some(value) if value < 0.0 => Err(RecordError::Negative { column, value }),
        other => Ok(other),
    }
}

fn shift(cell: &Option<Cell>, column: &'static str) -> Result<f64, RecordError> {
    match cell {
        Some(cell) => Ok(cell.as_number(column)?.unwrap_or(0.0)),
        None => Ok(0.0),
    }
}

impl RawRow {
    fn is_blank(&self) -> bool {
        [&self.code, &self.section_name, &self.shape, &self.subshape]
            .into_iter()
            .all(|cell| text_of(cell).is_empty())
    }

    fn into_record(self, row: usize) -> Result<DimensionRecord, RecordError> {
        let shape_name = text_of(&self.shape);
        let shape = ShapeFamily::parse(&shape_name).ok_or(RecordError::MissingShape)?;
        let subshape = Some(text_of(&self.subshape)).filter(|s| !s.is_empty());

        let dimensions = Dimensions {
            wt: dimension(&self.wt, "WT")?,
            h: dimension(&self.h, "H")?,
            wb: dimension(&self.wb, "WB")?,
            hr: dimension(&self.hr, "HR")?,
            thickness: dimension(&self.thickness, "Thickness")?,
            opening_width: dimension(&self.opening_width, "opening_width")?,
        };
        let shift = CoordinateShift {
            xl: shift(&self.xl_shift, "xl_shift")?,
            yb: shift(&self.yb_shift, "yb_shift")?,
        };

        Ok(DimensionRecord {
            row,
            code: text_of(&self.code),
            section_name: text_of(&self.section_name),
            shape,
            shape_name,
            subshape,
            dimensions,
            shift,
        })
    }
}

/// 一行的解析结果。
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    Valid(DimensionRecord),
    /// 标识列全空的行。
    Blank { row: usize },
    Invalid {
        row: usize,
        record_id: String,
        error: RecordError,
    },
}

/// 逐行解析后的记录表，保持输入顺序。
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    rows: Vec<ParsedRow>,
}

impl RecordTable {
    pub fn load(path: &Path) -> Result<Self, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data).map_err(|source| IoError::RecordTable {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 只有整体结构错误（不是对象数组）才返回错误；单行问题记录在 [`ParsedRow`] 中。
    pub fn from_json_str(data: &str) -> Result<Self, serde_json::Error> {
        let raw_rows: Vec<serde_json::Value> = serde_json::from_str(data)?;
        let rows = raw_rows
            .into_iter()
            .enumerate()
            .map(|(index, value)| parse_row(index + 1, value))
            .collect();
        Ok(Self { rows })
    }

    pub fn rows(&self) -> impl Iterator<Item = &ParsedRow> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<ParsedRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_row(row: usize, value: serde_json::Value) -> ParsedRow {
    let raw: RawRow = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(err) => {
            return ParsedRow::Invalid {
                row,
                record_id: format!("#{row}"),
                error: RecordError::NotNumeric {
                    column: "row",
                    value: err.to_string(),
                },
            };
        }
    };
    if raw.is_blank() {
        return ParsedRow::Blank { row };
    }
    let code = text_of(&raw.code);
    match raw.into_record(row) {
        Ok(record) => ParsedRow::Valid(record),
        Err(error) => ParsedRow::Invalid {
            row,
            record_id: if code.is_empty() {
                format!("#{row}")
            } else {
                format!("#{row} {code}")
            },
            error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(json: &str) -> ParsedRow {
        let table = RecordTable::from_json_str(json).expect("valid json");
        assert_eq!(table.len(), 1);
        table.into_rows().remove(0)
    }

    #[test]
    fn spreadsheet_headers_and_strings_are_accepted() {
        let row = single(
            r#"[{"code": 101, "Section Name": "B-1", "Shape": "Box Beam", "Subshape": "A",
                 "WT": "10", "H": 20, "WB": 8.0, "HR": "15", "Thickness": 0.5,
                 "xl  =": "-1.5", "yb  =": null}]"#,
        );
        let ParsedRow::Valid(record) = row else {
            panic!("expected valid row, got {row:?}");
        };
        assert_eq!(record.row, 1);
        assert_eq!(record.code, "101");
        assert_eq!(record.section_name, "B-1");
        assert_eq!(record.shape, ShapeFamily::BoxBeam);
        assert_eq!(record.shape_name, "Box Beam");
        assert_eq!(record.subshape.as_deref(), Some("A"));
        assert_eq!(record.dimensions.wt, Some(10.0));
        assert_eq!(record.dimensions.hr, Some(15.0));
        assert_eq!(record.dimensions.opening_width, None);
        assert!((record.shift.xl + 1.5).abs() < 1e-12);
        assert_eq!(record.shift.yb, 0.0);
        assert_eq!(record.title(), "101 _ B-1");
    }

    #[test]
    fn empty_dimension_cell_is_absent_not_zero() {
        let row = single(
            r#"[{"code": "C2", "shape": "Brace", "WT": 4, "H": 6, "WB": "", "HR": " ",
                 "Thickness": 0.25, "Brace Entering": 3}]"#,
        );
        let ParsedRow::Valid(record) = row else {
            panic!("expected valid row");
        };
        assert_eq!(record.dimensions.wb, None);
        assert_eq!(record.dimensions.hr, None);
        assert_eq!(record.dimensions.opening_width, Some(3.0));
        assert_eq!(record.bottom_slot_value(), Some(3.0));
    }

    #[test]
    fn non_numeric_dimension_invalidates_row() {
        let row = single(r#"[{"code": "X9", "shape": "Post", "H": "tall"}]"#);
        match row {
            ParsedRow::Invalid {
                row,
                record_id,
                error,
            } => {
                assert_eq!(row, 1);
                assert_eq!(record_id, "#1 X9");
                assert_eq!(
                    error,
                    RecordError::NotNumeric {
                        column: "H",
                        value: "tall".to_string()
                    }
                );
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn negative_dimension_and_missing_shape_are_rejected() {
        let negative = single(r#"[{"code": "N", "shape": "Post", "WT": -1}]"#);
        assert!(matches!(
            negative,
            ParsedRow::Invalid {
                error: RecordError::Negative { column: "WT", .. },
                ..
            }
        ));

        let shapeless = single(r#"[{"code": "S", "Section Name": "orphan"}]"#);
        assert!(matches!(
            shapeless,
            ParsedRow::Invalid {
                error: RecordError::MissingShape,
                ..
            }
        ));
    }

    #[test]
    fn blank_rows_are_reported_separately() {
        let table = RecordTable::from_json_str(
            r#"[{"code": "", "Shape": null, "WT": 3}, {"code": "A", "Shape": "Post"}]"#,
        )
        .expect("valid json");
        let rows: Vec<&ParsedRow> = table.rows().collect();
        assert_eq!(rows[0], &ParsedRow::Blank { row: 1 });
        assert!(matches!(rows[1], ParsedRow::Valid(record) if record.row == 2));
    }

    #[test]
    fn non_array_document_is_an_error() {
        assert!(RecordTable::from_json_str(r#"{"code": 1}"#).is_err());
    }
}
