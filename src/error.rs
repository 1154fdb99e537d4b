use thiserror::Error;

/// Main error type for sheet2sql.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum Sheet2SqlError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    ReferenceError(#[from] crate::spreadsheet::reference::ReferenceError),

    // Database module errors
    #[error("{0}")]
    RangeError(#[from] crate::database::range::RangeError),

    #[error("{0}")]
    TableError(#[from] crate::database::table::TableError),

    // SQL module errors
    #[error("{0}")]
    DialectError(#[from] crate::sql::dialect::DialectError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, Sheet2SqlError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| Sheet2SqlError::WithContextError(format!("{}: {}", message, e)))
    }
}
