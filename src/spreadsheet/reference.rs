//! Conversions between A1-style cell references and 0-based indexes.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Invalid column reference '{0}'")]
    ColumnFormatError(String),
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\$?([A-Za-z]+)\$?(\d+)$").expect("Hardcode regex pattern"))
}

/// Converts column letters to a 0-based index: `A` → 0, `Z` → 25, `AA` → 26.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .try_fold(0usize, |index, letter| {
            index.checked_mul(26)?.checked_add((letter - b'A') as usize + 1)
        })
        .map(|column| column - 1)
}

/// Converts a 1-based row number to a 0-based index.
pub fn row_to_index(number: &str) -> Option<usize> {
    number.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Parses a cell reference such as `B3` (or `$B$3`) into `(row, col)`.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = reference_pattern().captures(reference)?;
    let col = col_to_index(captures.get(1)?.as_str())?;
    let row = row_to_index(captures.get(2)?.as_str())?;
    Some((row, col))
}

/// Converts a 0-based column index to letters: 0 → `A`, 26 → `AA`.
pub fn index_to_col(col: usize) -> String {
    let mut letters = Vec::new();
    let mut column = col + 1;
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.iter().rev().map(|letter| *letter as char).collect()
}

/// Converts a 0-based `(row, col)` pair to an A1-style reference.
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

/// Parses a column bound given either as a 0-based index (`"2"`) or as
/// spreadsheet letters (`"C"`).
pub fn parse_column(value: &str) -> Result<usize, ReferenceError> {
    let value = value.trim();
    value
        .parse::<usize>()
        .ok()
        .or_else(|| col_to_index(value))
        .ok_or_else(|| ReferenceError::ColumnFormatError(value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_round_trip_through_boundaries() {
        assert_eq!(col_to_index("A"), Some(0));
        assert_eq!(col_to_index("z"), Some(25));
        assert_eq!(col_to_index("AA"), Some(26));
        assert_eq!(col_to_index("XFD"), Some(16383));
        assert_eq!(index_to_col(0), "A");
        assert_eq!(index_to_col(25), "Z");
        assert_eq!(index_to_col(26), "AA");
        assert_eq!(index_to_col(16383), "XFD");
    }

    #[test]
    fn invalid_column_letters() {
        assert_eq!(col_to_index(""), None);
        assert_eq!(col_to_index("A1"), None);
        assert_eq!(col_to_index("é"), None);
    }

    #[test]
    fn cell_references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("C12"), Some((11, 2)));
        assert_eq!(reference_to_index("$AB$3"), Some((2, 27)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(index_to_reference(11, 2), "C12");
    }

    #[test]
    fn column_bounds_accept_index_or_letters() {
        assert_eq!(parse_column("3").unwrap(), 3);
        assert_eq!(parse_column("D").unwrap(), 3);
        assert_eq!(parse_column(" d ").unwrap(), 3);
        assert!(parse_column("D4").is_err());
    }
}
