//! # sheet2sql
//!
//! Converts spreadsheet sheets into SQL `CREATE TABLE` and `INSERT` scripts
//! for MySQL, SQLite and PostgreSQL.
//!
//! ## Features
//!
//! - **Workbook reader**: streams `.xlsx` / `.xlsm` sheets into a grid of typed cells,
//!   honouring date number formats and both the 1900 and 1904 date systems
//! - **Windows**: pick the header row, the first data row and a column range per sheet
//! - **Type inference**: integer tiers sized by range, `DECIMAL` scaled by the longest
//!   fraction, `DATE` / `DATETIME`, `BOOLEAN` and `VARCHAR` / `TEXT` sized by length
//! - **Dialects**: native type names, identifier quoting and batched inserts per dialect
//!
//! ## Example
//!
//! ```no_run
//! use sheet2sql::{convert_workbook, render_script, ConvertOptions, Dialect};
//!
//! let options = ConvertOptions {
//!     dialect: Dialect::PostgreSql,
//!     table_prefix: Some("staging".to_owned()),
//!     ..ConvertOptions::default()
//! };
//! let sheets = convert_workbook("sales.xlsx", &options)?;
//! println!("{}", render_script(&sheets));
//! # Ok::<(), sheet2sql::Sheet2SqlError>(())
//! ```

pub mod convert;
pub mod database;
pub mod error;
mod helpers;
pub mod spreadsheet;
pub mod sql;

pub use convert::convert_sheets;
pub use convert::convert_workbook;
pub use convert::render_script;
pub use convert::sql_statements;
pub use convert::ConvertOptions;
pub use convert::SheetSql;
pub use database::column::Column;
pub use database::column::ColumnType;
pub use database::column::IntegerWidth;
pub use database::range::Window;
pub use database::table::parse_table;
pub use database::table::parse_table_sampled;
pub use database::table::TableData;
pub use database::table::TableError;
pub use database::value::CellValue;
pub use database::value::RawGrid;
pub use error::Sheet2SqlError;
pub use spreadsheet::open_workbook;
pub use spreadsheet::xlsx::XlsxWorkbook;
pub use spreadsheet::SpreadsheetError;
pub use sql::dialect::Dialect;
pub use sql::dialect::DialectError;
pub use sql::generator::generate_sql;
pub use sql::generator::GeneratedSql;
pub use sql::generator::SqlGenerator;
