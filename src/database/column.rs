use crate::database::value::CellValue;
use std::fmt::Display;

/// Precision used for every inferred DECIMAL column.
pub const DECIMAL_PRECISION: u8 = 20;
/// Upper bound on the inferred DECIMAL scale.
pub const MAX_DECIMAL_SCALE: u8 = 10;
/// Text columns never get a VARCHAR narrower than this.
pub const MIN_VARCHAR_LENGTH: usize = 50;
/// Longest text that still fits a VARCHAR column; longer text becomes TEXT.
pub const MAX_VARCHAR_LENGTH: usize = 255;

/// Storage width of an integer column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegerWidth {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
}

impl IntegerWidth {
    const ALL: [IntegerWidth; 4] = [Self::TinyInt, Self::SmallInt, Self::Int, Self::BigInt];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
        }
    }

    /// Inclusive signed range of the width.
    const fn signed_bounds(&self) -> (i128, i128) {
        match self {
            Self::TinyInt => (i8::MIN as i128, i8::MAX as i128),
            Self::SmallInt => (i16::MIN as i128, i16::MAX as i128),
            Self::Int => (i32::MIN as i128, i32::MAX as i128),
            Self::BigInt => (i64::MIN as i128, i64::MAX as i128),
        }
    }

    /// Largest value of the unsigned variant.
    const fn unsigned_max(&self) -> i128 {
        match self {
            Self::TinyInt => u8::MAX as i128,
            Self::SmallInt => u16::MAX as i128,
            Self::Int => u32::MAX as i128,
            Self::BigInt => u64::MAX as i128,
        }
    }

    /// Smallest width holding `[min, max]`; unsigned when `min` is not negative.
    pub fn fit(min: i64, max: i64) -> (IntegerWidth, bool) {
        let (min, max) = (min as i128, max as i128);
        let unsigned = min >= 0;
        let width = Self::ALL
            .into_iter()
            .find(|width| {
                if unsigned {
                    max <= width.unsigned_max()
                } else {
                    let (lower, upper) = width.signed_bounds();
                    lower <= min && max <= upper
                }
            })
            .unwrap_or(Self::BigInt);
        (width, unsigned)
    }
}

/// Dialect-independent logical column type with its parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer { width: IntegerWidth, unsigned: bool },
    Decimal { precision: u8, scale: u8 },
    Varchar(usize),
    Text,
    Date,
    DateTime,
    Boolean,
}

impl ColumnType {
    /// Infers a column type from the column's sampled values; nulls are ignored.
    ///
    /// First match wins: integers (sized by range), numbers with at least one
    /// non-integral value (DECIMAL scaled by the longest fraction), date/times,
    /// booleans, and finally text sized by its longest value.
    pub fn detect<'a, I>(values: I) -> ColumnType
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let values: Vec<&CellValue> = values.into_iter().filter(|value| !value.is_null()).collect();
        if values.is_empty() {
            ColumnType::Text
        } else if values.iter().all(|value| matches!(value, CellValue::Integer(_))) {
            Self::detect_integer(&values)
        } else if values.iter().all(|value| matches!(value, CellValue::Integer(_) | CellValue::Float(_))) {
            Self::detect_decimal(&values)
        } else if values.iter().all(|value| matches!(value, CellValue::DateTime(_))) {
            if values.iter().any(|value| value.has_time()) {
                ColumnType::DateTime
            } else {
                ColumnType::Date
            }
        } else if values.iter().all(|value| matches!(value, CellValue::Boolean(_))) {
            ColumnType::Boolean
        } else {
            Self::detect_text(&values)
        }
    }

    fn detect_integer(values: &[&CellValue]) -> ColumnType {
        let integers = values.iter().filter_map(|value| match value {
            CellValue::Integer(integer) => Some(*integer),
            _ => None,
        });
        let (min, max) = integers.fold((i64::MAX, i64::MIN), |(min, max), integer| {
            (min.min(integer), max.max(integer))
        });
        let (width, unsigned) = IntegerWidth::fit(min, max);
        ColumnType::Integer { width, unsigned }
    }

    fn detect_decimal(values: &[&CellValue]) -> ColumnType {
        let digits = values
            .iter()
            .map(|value| match value {
                CellValue::Float(float) if float.is_finite() => fraction_digits(*float),
                _ => 0,
            })
            .max()
            .unwrap_or(0);
        ColumnType::Decimal {
            precision: DECIMAL_PRECISION,
            scale: digits.min(MAX_DECIMAL_SCALE as usize) as u8,
        }
    }

    fn detect_text(values: &[&CellValue]) -> ColumnType {
        let length = values
            .iter()
            .map(|value| value.to_string().chars().count())
            .max()
            .unwrap_or(0);
        if length <= MAX_VARCHAR_LENGTH {
            ColumnType::Varchar(length.max(MIN_VARCHAR_LENGTH))
        } else {
            ColumnType::Text
        }
    }

    /// Applies the null policy of this type to a column value.
    ///
    /// Numeric and date columns keep nulls, text columns turn every value
    /// (null included) into text, boolean columns read null as `false`.
    pub fn normalize(&self, value: CellValue) -> CellValue {
        match (self, value) {
            (ColumnType::Varchar(_) | ColumnType::Text, CellValue::Null) => CellValue::Text(String::new()),
            (ColumnType::Varchar(_) | ColumnType::Text, CellValue::Text(text)) => CellValue::Text(text),
            (ColumnType::Varchar(_) | ColumnType::Text, value) => CellValue::Text(value.to_string()),
            (ColumnType::Boolean, CellValue::Null) => CellValue::Boolean(false),
            (_, value) => value,
        }
    }

    /// Logical type name without parameters, e.g. `SMALLINT` or `DECIMAL`.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            ColumnType::Integer { width, .. } => width.as_str(),
            ColumnType::Decimal { .. } => "DECIMAL",
            ColumnType::Varchar(_) => "VARCHAR",
            ColumnType::Text => "TEXT",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Boolean => "BOOLEAN",
        }
    }

    /// Parameter list carried by the type, e.g. `(20,2)` or `(50)`.
    pub fn parameters(&self) -> Option<String> {
        match self {
            ColumnType::Decimal { precision, scale } => Some(format!("({precision},{scale})")),
            ColumnType::Varchar(length) => Some(format!("({length})")),
            _ => None,
        }
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, ColumnType::Integer { .. })
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, ColumnType::Varchar(_) | ColumnType::Text)
    }
}

impl Display for ColumnType {
    /// Canonical logical name, e.g. `SMALLINT UNSIGNED`, `DECIMAL(20,2)`, `VARCHAR(50)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Integer { width, unsigned: true } => write!(f, "{} UNSIGNED", width.as_str()),
            _ => write!(f, "{}{}", self.kind_name(), self.parameters().unwrap_or_default()),
        }
    }
}

/// Number of digits after the decimal point in the shortest decimal rendering.
fn fraction_digits(value: f64) -> usize {
    let text = value.to_string();
    text.find('.').map(|index| text.len() - index - 1).unwrap_or(0)
}

/// A resolved column of a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Column name from the header row, deduplicated
    pub name: String,
    /// Inferred logical type
    pub kind: ColumnType,
    /// 0-based column of the source sheet
    pub source_index: usize,
}
