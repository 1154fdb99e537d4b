//! SQL literals for cell values.
//!
//! Values that do not fit their column type degrade to a fixed literal
//! (`0`, `0.0`, `'0000-00-00'`) instead of failing.

use crate::database::column::ColumnType;
use crate::database::value::CellValue;

/// Rendered for date columns holding something other than a date.
pub const ZERO_DATE: &str = "'0000-00-00'";

/// Renders `value` as a literal for a column of type `kind`.
pub fn format_value(value: &CellValue, kind: &ColumnType) -> String {
    if value.is_null() {
        return "NULL".to_owned();
    }
    match kind {
        ColumnType::Integer { .. } | ColumnType::Boolean => format_integer(value),
        ColumnType::Decimal { .. } => format_decimal(value),
        ColumnType::Date => format_datetime(value, "%Y-%m-%d"),
        ColumnType::DateTime => format_datetime(value, "%Y-%m-%d %H:%M:%S"),
        ColumnType::Varchar(_) | ColumnType::Text => quote_text(&value.to_string()),
    }
}

fn format_integer(value: &CellValue) -> String {
    let integer = match value {
        CellValue::Boolean(boolean) => i64::from(*boolean),
        CellValue::Integer(integer) => *integer,
        CellValue::Float(float) if float.is_finite() => float.trunc() as i64,
        CellValue::Text(text) => text.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    integer.to_string()
}

fn format_decimal(value: &CellValue) -> String {
    let float = match value {
        CellValue::Integer(integer) => *integer as f64,
        CellValue::Float(float) => *float,
        CellValue::Boolean(boolean) => f64::from(u8::from(*boolean)),
        CellValue::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if !float.is_finite() {
        return "0.0".to_owned();
    }
    let mut literal = float.to_string();
    if !literal.contains('.') {
        literal.push_str(".0");
    }
    literal
}

fn format_datetime(value: &CellValue, format: &str) -> String {
    match value {
        CellValue::DateTime(datetime) => format!("'{}'", datetime.format(format)),
        _ => ZERO_DATE.to_owned(),
    }
}

/// Wraps text in single quotes, doubling embedded quotes.
pub fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
