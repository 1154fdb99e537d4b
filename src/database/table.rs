use crate::database::column::Column;
use crate::database::column::ColumnType;
use crate::database::range::Window;
use crate::database::value::CellValue;
use crate::database::value::RawGrid;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Header row index {0} is out of range for a sheet with {1} rows")]
    RowIndexOutOfRange(usize, usize),

    #[error("End column index {1} precedes start column index {0}")]
    InvalidColumnRange(usize, usize),
}

/// A table carved out of a sheet: resolved columns plus normalized rows.
#[derive(Clone, Debug, PartialEq)]
pub struct TableData {
    /// Table name before sanitizing, usually the sheet name
    pub table_name: String,
    /// Column definitions in sheet order
    pub columns: Vec<Column>,
    /// Data rows, one value per column in column order
    pub rows: Vec<Vec<CellValue>>,
}

impl TableData {
    pub fn with_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as records addressable by column name.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.rows.iter().map(|values| Record {
            columns: &self.columns,
            values,
        })
    }
}

/// One row of a [`TableData`], keyed by column name.
#[derive(Copy, Clone, Debug)]
pub struct Record<'a> {
    columns: &'a [Column],
    values: &'a [CellValue],
}

impl<'a> Record<'a> {
    pub fn get(&self, name: &str) -> Option<&'a CellValue> {
        self.columns
            .iter()
            .position(|column| column.name == name)
            .and_then(|index| self.values.get(index))
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Column, &'a CellValue)> + 'a {
        self.columns.iter().zip(self.values.iter())
    }
}

/// Carves a table out of `grid`, inferring each column type from every data row.
pub fn parse_table(grid: &RawGrid, window: &Window) -> Result<TableData, TableError> {
    parse_table_sampled(grid, window, None)
}

/// Like [`parse_table`], inferring column types from the first `analyze_rows`
/// data rows only. Rows outside the sample are still part of the table.
pub fn parse_table_sampled(
    grid: &RawGrid,
    window: &Window,
    analyze_rows: Option<usize>,
) -> Result<TableData, TableError> {
    if window.header_row >= grid.row_count() {
        return Err(TableError::RowIndexOutOfRange(window.header_row, grid.row_count()));
    }
    let columns = match window.columns(grid.col_count())? {
        Some(range) => range.collect::<Vec<_>>(),
        None => {
            warn!("Column window starting at {} selects no columns", window.column_start);
            Vec::new()
        }
    };

    let headers = resolve_headers(columns.iter().map(|col| grid.get(window.header_row, *col)));
    let row_count = grid.row_count().saturating_sub(window.data_start_row);
    let sample_size = analyze_rows.map_or(row_count, |limit| limit.min(row_count));

    let columns = columns
        .iter()
        .zip(headers)
        .enumerate()
        .map(|(position, (col, name))| {
            let values = (0..sample_size).map(|row| grid.get(window.data_start_row + row, *col));
            let kind = ColumnType::detect(values);
            debug!("Column #{position} '{name}' inferred as {kind}");
            Column {
                name,
                kind,
                source_index: *col,
            }
        })
        .collect::<Vec<_>>();

    let rows = (0..row_count)
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    let value = grid.get(window.data_start_row + row, column.source_index);
                    column.kind.normalize(value.clone())
                })
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(TableData {
        table_name: String::new(),
        columns,
        rows,
    })
}

/// Turns header cells into unique column names.
///
/// Blank headers become `column_<position>`; repeats get `_1`, `_2`, ... and
/// the suffix keeps growing while the candidate is already taken.
fn resolve_headers<'a, I>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let names = cells.into_iter().enumerate().map(|(position, cell)| {
        let name = cell.to_string();
        if name.trim().is_empty() {
            format!("column_{position}")
        } else {
            name
        }
    });

    let mut taken = HashSet::new();
    names
        .map(|name| {
            let mut candidate = name.clone();
            let mut suffix = 1;
            while taken.contains(&candidate) {
                candidate = format!("{name}_{suffix}");
                suffix += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}
