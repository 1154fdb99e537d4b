use crate::database::table::TableError;
use crate::error::Sheet2SqlError;
use crate::spreadsheet::reference::parse_column;
use regex::Regex;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Errors related to column range parsing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid column range format '{0}'")]
    FormatError(String),
}

/// The sub-rectangle of a sheet that is turned into a table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    /// Row holding the column names (0-based)
    pub header_row: usize,
    /// First data row (0-based)
    pub data_start_row: usize,
    /// First column of the window (0-based)
    pub column_start: usize,
    /// Last column of the window (0-based, inclusive), None for the last column of the sheet
    pub column_end: Option<usize>,
}

impl Window {
    /// Resolves the inclusive column range against a sheet `col_count` columns wide.
    ///
    /// The end is clamped to the last column; `None` means the window lies
    /// entirely to the right of the sheet.
    pub fn columns(&self, col_count: usize) -> Result<Option<RangeInclusive<usize>>, TableError> {
        if let Some(end) = self.column_end.filter(|end| *end < self.column_start) {
            return Err(TableError::InvalidColumnRange(self.column_start, end));
        }
        if col_count <= self.column_start {
            return Ok(None);
        }
        let end = self.column_end.map_or(col_count - 1, |end| end.min(col_count - 1));
        Ok(Some(self.column_start..=end))
    }

    /// Sets the column bounds from a range such as `B:F`, `B:` or `2:5`.
    pub fn with_column_range(mut self, value: &str) -> Result<Self, Sheet2SqlError> {
        let pattern = Regex::new(r"^\s*([A-Za-z]+|\d+)?\s*(:\s*([A-Za-z]+|\d+)?)?\s*$").expect("Hardcode regex pattern");
        let captures = pattern
            .captures(value)
            .ok_or(RangeError::FormatError(value.to_owned()))?;
        self.column_start = match captures.get(1) {
            Some(matcher) => parse_column(matcher.as_str())?,
            None => 0,
        };
        self.column_end = match (captures.get(2), captures.get(3)) {
            (_, Some(matcher)) => Some(parse_column(matcher.as_str())?),
            (Some(_), None) => None,
            (None, None) => Some(self.column_start),
        };
        Ok(self)
    }
}

impl Default for Window {
    /// Header on the first row, data from the second row, every column.
    fn default() -> Self {
        Window {
            header_row: 0,
            data_start_row: 1,
            column_start: 0,
            column_end: None,
        }
    }
}
