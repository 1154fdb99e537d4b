//! # Table Extraction
//!
//! Turns a [`RawGrid`](value::RawGrid) into a [`TableData`](table::TableData):
//! the [`Window`](range::Window) selects header row, data rows and columns,
//! [`ColumnType::detect`](column::ColumnType::detect) infers one logical type
//! per column and [`ColumnType::normalize`](column::ColumnType::normalize)
//! applies that type's null policy.

pub mod column;
pub mod range;
pub mod table;
pub mod value;
