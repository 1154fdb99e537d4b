use chrono::NaiveDateTime;
use chrono::Timelike;
use std::fmt::Display;

/// A single spreadsheet cell after extraction.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Null,
}

impl CellValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns true if a date/time value carries a non-midnight time of day.
    pub(crate) fn has_time(&self) -> bool {
        match self {
            CellValue::DateTime(datetime) => {
                datetime.hour() != 0 || datetime.minute() != 0 || datetime.second() != 0
            }
            _ => false,
        }
    }
}

impl Display for CellValue {
    /// Text rendering used for header names and for values stored in text columns.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Boolean(true) => f.write_str("True"),
            CellValue::Boolean(false) => f.write_str("False"),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Row-major grid of cells as handed over by the spreadsheet reader.
/// Row 0 is the first spreadsheet row; rows may be ragged, missing cells read as null.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        RawGrid { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        const NULL: &CellValue = &CellValue::Null;
        self.rows.get(row).and_then(|cells| cells.get(col)).unwrap_or(NULL)
    }
}

impl From<Vec<Vec<CellValue>>> for RawGrid {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        RawGrid::new(rows)
    }
}
