use crate::database::value::CellValue;
use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;

/// Types of cell data in an `.xlsx` worksheet.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (`1`/`0`)
    Boolean,
    /// Plain numeric values
    Number,
    /// Serial date with a time of day
    NumberDateTime { is_1904: bool },
    /// Serial date
    NumberDate { is_1904: bool },
    /// Fraction of a day
    NumberTime,
    /// ISO 8601 date/time strings (`t="d"`)
    IsoDateTime,
    /// Inline or formula string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values such as `#DIV/0!`
    Error,
}

impl CellType {
    /// Cell type implied by a built-in number format id.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(Self::NumberDateTime { is_1904 }),
            "14" | "15" | "16" | "17" => Some(Self::NumberDate { is_1904 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::NumberTime),
            _ => None,
        }
    }

    /// Cell type implied by a custom format code such as `yyyy-mm-dd hh:mm`.
    /// Quoted literals, escaped characters and bracketed sections are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time) {
            (true, true) => Self::NumberDateTime { is_1904 },
            (true, false) => Self::NumberDate { is_1904 },
            (false, true) => Self::NumberTime,
            (false, false) => Self::Number,
        }
    }

    /// Cell type from the `t` attribute of a `<c>` element.
    pub(crate) fn from_type_attribute(value: Option<&str>) -> Self {
        match value {
            Some("inlineStr" | "str") => Self::InlineString,
            Some("s") => Self::SharedString,
            Some("d") => Self::IsoDateTime,
            Some("b") => Self::Boolean,
            Some("e") => Self::Error,
            _ => Self::Number,
        }
    }
}

/// A single non-empty cell read from a worksheet.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Raw cell text as stored in the sheet
    pub(crate) value: String,
}

impl Cell {
    /// Returns the A1-style cell reference.
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the raw text into a [`CellValue`], resolving shared strings from `shared_strings`.
    ///
    /// Fails with a message when a numeric cell does not hold a number.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<CellValue, String> {
        let value = match self.kind {
            CellType::Empty | CellType::Error => CellValue::Null,
            _ if self.value.is_empty() => CellValue::Null,
            CellType::Boolean => CellValue::Boolean(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => to_number(self.to_double()?),
            CellType::NumberDate { is_1904 } | CellType::NumberDateTime { is_1904 } => {
                let serial = self.to_double()?;
                to_datetime(serial, is_1904)
                    .map(CellValue::DateTime)
                    .ok_or_else(|| format!("serial date '{}' is out of range", self.value))?
            }
            CellType::NumberTime => CellValue::Text(to_time_string(self.to_double()?)),
            CellType::IsoDateTime => to_iso_datetime(&self.value)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(self.value.to_owned())),
            CellType::InlineString => CellValue::Text(self.value.to_owned()),
            CellType::SharedString => {
                let index = self
                    .value
                    .parse::<usize>()
                    .map_err(|_| format!("parse shared string index '{}' failed", self.value))?;
                shared_strings
                    .get(index)
                    .map(|text| CellValue::Text(text.to_owned()))
                    .ok_or_else(|| format!("shared string index {index} is out of range"))?
            }
        };
        Ok(value)
    }

    fn to_double(&self) -> Result<f64, String> {
        self.value
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("parse '{}' to number failed", self.value))
    }
}

/// Whole numbers that fit an `i64` become integers, the rest stay floating point.
fn to_number(value: f64) -> CellValue {
    const LIMIT: f64 = 9_223_372_036_854_775_808f64; // 2^63
    if value.is_finite() && value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value) {
        CellValue::Integer(value as i64)
    } else {
        CellValue::Float(value)
    }
}

/// Converts a serial date number to a date and time of day.
/// Serials below 60 are shifted by a day for the Lotus 1-2-3 leap year bug.
fn to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc() as i64;
    let offset: i64 = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let seconds = (serial.fract().abs() * 86_400f64).round() as i64;
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    base.checked_add_signed(Duration::try_days(days.checked_add(offset)?)?)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

/// Converts a fraction of a day to `HH:MM:SS`.
fn to_time_string(value: f64) -> String {
    let mut seconds = (value.fract().abs() * 86_400f64).round() as i64 % 86_400;
    let hours = seconds / 3600;
    seconds %= 3600;
    let minutes = seconds / 60;
    seconds %= 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn to_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 1,
            col: 2,
            kind,
            value: value.to_owned(),
        }
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> CellValue {
        CellValue::DateTime(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, mi, s).unwrap())
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate { is_1904: false }));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime { is_1904: true }));
        assert_eq!(CellType::parse_builtin_number_format_id("20", false), Some(CellType::NumberTime));
        assert_eq!(CellType::parse_builtin_number_format_id("0", false), None);
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate { is_1904: false });
        assert_eq!(CellType::parse_custom_number_format("yyyy/m/d h:mm", false), CellType::NumberDateTime { is_1904: false });
        assert_eq!(CellType::parse_custom_number_format("[h]:mm:ss", false), CellType::NumberTime);
        assert_eq!(CellType::parse_custom_number_format("#,##0.00\" days\"", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
    }

    #[test]
    fn numbers_split_into_integers_and_floats() {
        assert_eq!(cell(CellType::Number, "42").to_value(&[]).unwrap(), CellValue::Integer(42));
        assert_eq!(cell(CellType::Number, "1E3").to_value(&[]).unwrap(), CellValue::Integer(1000));
        assert_eq!(cell(CellType::Number, "-3.0").to_value(&[]).unwrap(), CellValue::Integer(-3));
        assert_eq!(cell(CellType::Number, "2.25").to_value(&[]).unwrap(), CellValue::Float(2.25));
        assert_eq!(cell(CellType::Number, "1e20").to_value(&[]).unwrap(), CellValue::Float(1e20));
        assert!(cell(CellType::Number, "abc").to_value(&[]).is_err());
    }

    #[test]
    fn serial_dates() {
        let date = CellType::NumberDate { is_1904: false };
        assert_eq!(cell(date, "45000").to_value(&[]).unwrap(), datetime(2023, 3, 15, 0, 0, 0));
        assert_eq!(cell(date, "1").to_value(&[]).unwrap(), datetime(1900, 1, 1, 0, 0, 0));
        assert_eq!(cell(date, "61").to_value(&[]).unwrap(), datetime(1900, 3, 1, 0, 0, 0));
        let date_1904 = CellType::NumberDate { is_1904: true };
        assert_eq!(cell(date_1904, "0").to_value(&[]).unwrap(), datetime(1904, 1, 1, 0, 0, 0));
    }

    #[test]
    fn serial_datetimes_keep_time_of_day() {
        let kind = CellType::NumberDateTime { is_1904: false };
        assert_eq!(cell(kind, "45000.5").to_value(&[]).unwrap(), datetime(2023, 3, 15, 12, 0, 0));
        assert_eq!(cell(kind, "45000.75").to_value(&[]).unwrap(), datetime(2023, 3, 15, 18, 0, 0));
    }

    #[test]
    fn times_become_text() {
        assert_eq!(cell(CellType::NumberTime, "0.5").to_value(&[]).unwrap(), CellValue::from("12:00:00"));
        assert_eq!(cell(CellType::NumberTime, "0.75").to_value(&[]).unwrap(), CellValue::from("18:00:00"));
        assert_eq!(cell(CellType::NumberTime, "0.999999999").to_value(&[]).unwrap(), CellValue::from("00:00:00"));
    }

    #[test]
    fn huge_serial_dates_are_rejected() {
        for kind in [CellType::NumberDate { is_1904: false }, CellType::NumberDateTime { is_1904: true }] {
            for value in ["1e15", "1e300", "-1e20", "9223372036854775807"] {
                let error = cell(kind, value).to_value(&[]).unwrap_err();
                assert_eq!(error, format!("serial date '{value}' is out of range"));
            }
        }
    }

    #[test]
    fn strings_booleans_and_errors() {
        let strings = vec!["zero".to_owned(), "one".to_owned()];
        assert_eq!(cell(CellType::SharedString, "1").to_value(&strings).unwrap(), CellValue::from("one"));
        assert!(cell(CellType::SharedString, "2").to_value(&strings).is_err());
        assert_eq!(cell(CellType::InlineString, "x").to_value(&[]).unwrap(), CellValue::from("x"));
        assert_eq!(cell(CellType::Boolean, "1").to_value(&[]).unwrap(), CellValue::Boolean(true));
        assert_eq!(cell(CellType::Boolean, "0").to_value(&[]).unwrap(), CellValue::Boolean(false));
        assert_eq!(cell(CellType::Error, "#DIV/0!").to_value(&[]).unwrap(), CellValue::Null);
        assert_eq!(cell(CellType::Number, "").to_value(&[]).unwrap(), CellValue::Null);
    }

    #[test]
    fn iso_dates() {
        let kind = CellType::IsoDateTime;
        assert_eq!(cell(kind, "2024-05-06T07:08:09").to_value(&[]).unwrap(), datetime(2024, 5, 6, 7, 8, 9));
        assert_eq!(cell(kind, "2024-05-06").to_value(&[]).unwrap(), datetime(2024, 5, 6, 0, 0, 0));
        assert_eq!(cell(kind, "soon").to_value(&[]).unwrap(), CellValue::from("soon"));
    }

    #[test]
    fn reference_of_cell() {
        assert_eq!(cell(CellType::Number, "1").reference(), "C2");
    }
}
