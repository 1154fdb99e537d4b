//! # Spreadsheet Reader
//!
//! Reads Office Open XML workbooks (`.xlsx`, `.xlsm`) into [`RawGrid`]s.
//! Sheet parts are streamed with quick-xml straight out of the zip archive;
//! number formats decide whether a numeric cell is a plain number, a date,
//! a date-time or a time of day.
//!
//! [`RawGrid`]: crate::database::value::RawGrid

pub(crate) mod cell;
pub mod reference;
pub mod xlsx;

use crate::error::Sheet2SqlError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use xlsx::XlsxWorkbook;

/// File extensions handled by [`open_workbook`].
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Spreadsheet '{0}' not found")]
    SourceNotFound(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Invalid spreadsheet file: {0}")]
    FileError(String),

    #[error("Unsupported spreadsheet format '{0}', expected one of: xlsx, xlsm")]
    UnsupportedFormat(String),

    #[error("Invalid cell value in sheet '{0}' at {1}: {2}")]
    CellValueError(String, String, String),
}

/// Workbook backed by a local file.
pub type FileWorkbook = XlsxWorkbook<BufReader<File>>;

/// Opens a workbook from a local path.
pub fn open_workbook(path: impl AsRef<Path>) -> Result<FileWorkbook, Sheet2SqlError> {
    let path = path.as_ref();
    if !path.exists() {
        Err(SpreadsheetError::SourceNotFound(path.display().to_string()))?
    }

    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Err(SpreadsheetError::UnsupportedFormat(path.display().to_string()))?
    }

    debug!("Opening workbook '{}'", path.display());
    let file = File::open(path)?;
    XlsxWorkbook::from_reader(BufReader::new(file))
}
