//! Workbook to SQL conversion.

use crate::database::range::Window;
use crate::database::table::parse_table_sampled;
use crate::database::table::TableData;
use crate::error::ResultMessage;
use crate::error::Sheet2SqlError;
use crate::spreadsheet::open_workbook;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use crate::spreadsheet::SpreadsheetError;
use crate::sql::dialect::Dialect;
use crate::sql::generator::GeneratedSql;
use crate::sql::generator::SqlGenerator;
use glob::Pattern;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use tracing::info;
use tracing::warn;

/// Options for converting a workbook.
#[derive(Clone, Debug, Default)]
pub struct ConvertOptions {
    /// Target SQL dialect
    pub dialect: Dialect,
    /// Prepended to every table name as `<prefix>_`
    pub table_prefix: Option<String>,
    /// Sheet name or glob pattern, None for every sheet
    pub sheet: Option<String>,
    /// Rows and columns forming the table on each sheet
    pub window: Window,
    /// Number of data rows sampled for type inference, None for all rows
    pub analyze_rows: Option<usize>,
}

impl ConvertOptions {
    /// Checks if a sheet is selected. A plain name always matches itself.
    pub fn accept(&self, sheet_name: &str) -> Result<bool, Sheet2SqlError> {
        match &self.sheet {
            Some(sheet) if sheet == sheet_name => Ok(true),
            Some(sheet) => Ok(Pattern::new(sheet)?.matches(sheet_name)),
            None => Ok(true),
        }
    }
}

/// One converted sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetSql {
    pub sheet_name: String,
    pub table: TableData,
    pub sql: GeneratedSql,
}

/// Converts every selected sheet of the workbook at `path`.
pub fn convert_workbook(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Vec<SheetSql>, Sheet2SqlError> {
    let path = path.as_ref();
    let mut workbook = open_workbook(path).with_prefix(&path.display().to_string())?;
    convert_sheets(&mut workbook, options)
}

/// Converts every selected sheet of an opened workbook, in workbook order.
///
/// Sheets without any value are skipped.
pub fn convert_sheets<R: Read + Seek>(
    workbook: &mut XlsxWorkbook<R>,
    options: &ConvertOptions,
) -> Result<Vec<SheetSql>, Sheet2SqlError> {
    let mut selected = Vec::new();
    for sheet_name in workbook.sheet_names() {
        if options.accept(&sheet_name)? {
            selected.push(sheet_name);
        }
    }
    if let Some(pattern) = options.sheet.as_ref().filter(|_| selected.is_empty()) {
        Err(SpreadsheetError::SheetNotFound(pattern.to_owned()))?
    }

    let generator = SqlGenerator::new(options.dialect, options.table_prefix.as_deref());
    let mut sheets = Vec::with_capacity(selected.len());
    for sheet_name in selected {
        let grid = workbook.read_grid(&sheet_name)?;
        if grid.is_empty() {
            warn!("Skipping empty sheet '{}'", sheet_name);
            continue;
        }

        let table = parse_table_sampled(&grid, &options.window, options.analyze_rows)
            .map_err(Sheet2SqlError::from)
            .with_prefix(&format!("Sheet '{sheet_name}'"))?
            .with_name(&sheet_name);
        if table.columns.is_empty() {
            warn!("Sheet '{}' has no columns in the selected window", sheet_name);
        }
        let sql = generator.generate(&sheet_name, &table);
        info!(
            "Converted sheet '{}' to table {} with {} columns and {} rows",
            sheet_name,
            generator.table_name(&sheet_name),
            table.columns.len(),
            table.row_count()
        );
        sheets.push(SheetSql { sheet_name, table, sql });
    }
    Ok(sheets)
}

/// Statements of every sheet in order: create, then inserts joined by newlines.
pub fn sql_statements(sheets: &[SheetSql]) -> Vec<String> {
    sheets
        .iter()
        .flat_map(|sheet| [sheet.sql.create_statement.clone(), sheet.sql.insert_statements.join("\n")])
        .collect()
}

/// The whole SQL script, statement blocks separated by a blank line.
pub fn render_script(sheets: &[SheetSql]) -> String {
    sql_statements(sheets).join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::column::ColumnType;
    use crate::spreadsheet::xlsx::tests::archive;
    use crate::spreadsheet::xlsx::tests::sample_workbook;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::io::Write;

    fn workbook() -> XlsxWorkbook<Cursor<Vec<u8>>> {
        XlsxWorkbook::from_reader(Cursor::new(sample_workbook(false))).unwrap()
    }

    #[test]
    fn converts_every_sheet_in_order() {
        let sheets = convert_sheets(&mut workbook(), &ConvertOptions::default()).unwrap();
        let names = sheets.iter().map(|sheet| sheet.sheet_name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["People", "Misc"]);

        let people = &sheets[0].table;
        let kinds = people.columns.iter().map(|column| column.kind.to_string()).collect::<Vec<_>>();
        assert_eq!(kinds, vec!["DECIMAL(20,1)", "VARCHAR(50)", "DATETIME", "BOOLEAN", "TEXT", "VARCHAR(50)"]);
        assert_eq!(people.row_count(), 3);
    }

    #[test]
    fn selects_sheets_by_name_or_pattern() {
        let options = ConvertOptions {
            sheet: Some("Misc".to_owned()),
            ..ConvertOptions::default()
        };
        let sheets = convert_sheets(&mut workbook(), &options).unwrap();
        assert_eq!(sheets.len(), 1);

        let options = ConvertOptions {
            sheet: Some("P*".to_owned()),
            ..ConvertOptions::default()
        };
        let sheets = convert_sheets(&mut workbook(), &options).unwrap();
        assert_eq!(sheets[0].sheet_name, "People");
    }

    #[test]
    fn unmatched_sheet_is_an_error() {
        let options = ConvertOptions {
            sheet: Some("Nope".to_owned()),
            ..ConvertOptions::default()
        };
        let error = convert_sheets(&mut workbook(), &options).unwrap_err();
        assert!(matches!(error, Sheet2SqlError::SpreadsheetError(SpreadsheetError::SheetNotFound(_))));
    }

    #[test]
    fn window_errors_name_the_sheet() {
        let options = ConvertOptions {
            sheet: Some("Misc".to_owned()),
            window: Window {
                header_row: 3,
                ..Window::default()
            },
            ..ConvertOptions::default()
        };
        let error = convert_sheets(&mut workbook(), &options).unwrap_err();
        assert_eq!(error.to_string(), "Sheet 'Misc': Header row index 3 is out of range for a sheet with 1 rows");
    }

    #[test]
    fn header_only_sheet_produces_comment() {
        let options = ConvertOptions {
            dialect: Dialect::Sqlite,
            table_prefix: Some("raw".to_owned()),
            sheet: Some("Misc".to_owned()),
            ..ConvertOptions::default()
        };
        let sheets = convert_sheets(&mut workbook(), &options).unwrap();
        assert_eq!(
            render_script(&sheets),
            "CREATE TABLE IF NOT EXISTS \"raw_Misc\" (\n  \"a & b\" TEXT,\n  \"7\" TEXT\n);\n\n-- No data to insert into table raw_Misc"
        );
    }

    #[test]
    fn windowed_conversion() {
        let options = ConvertOptions {
            sheet: Some("People".to_owned()),
            window: Window::default().with_column_range("B:C").unwrap(),
            analyze_rows: Some(1),
            ..ConvertOptions::default()
        };
        let sheets = convert_sheets(&mut workbook(), &options).unwrap();
        let table = &sheets[0].table;
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1].kind, ColumnType::Date);
        assert_eq!(
            sheets[0].sql.insert_statements,
            vec!["INSERT INTO `People` (`name`, `joined`) VALUES\n('Alice', '2023-03-15'),\n('', NULL),\n('東京', '2023-03-15');"]
        );
    }

    #[test]
    fn statements_alternate_create_and_insert() {
        let sheets = convert_sheets(&mut workbook(), &ConvertOptions::default()).unwrap();
        let statements = sql_statements(&sheets);
        assert_eq!(statements.len(), 4);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS `People`"));
        assert!(statements[1].starts_with("INSERT INTO `People`"));
        assert!(statements[2].starts_with("CREATE TABLE IF NOT EXISTS `Misc`"));
        assert!(statements[3].starts_with("-- No data"));
    }

    #[test]
    fn skips_empty_sheets() {
        let bytes = archive(&[
            (
                "xl/workbook.xml",
                r#"<workbook xmlns:r="r"><sheets><sheet name="Empty" r:id="rId1"/></sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships><Relationship Id="rId1" Target="worksheets/sheet1.xml"/></Relationships>"#,
            ),
            ("xl/worksheets/sheet1.xml", "<worksheet><sheetData/></worksheet>"),
        ]);
        let mut workbook = XlsxWorkbook::from_reader(Cursor::new(bytes)).unwrap();
        let sheets = convert_sheets(&mut workbook, &ConvertOptions::default()).unwrap();
        assert!(sheets.is_empty());
        assert_eq!(render_script(&sheets), "");
    }

    #[test]
    fn converts_from_path() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(&sample_workbook(false)).unwrap();
        file.flush().unwrap();
        let sheets = convert_workbook(file.path(), &ConvertOptions::default()).unwrap();
        assert_eq!(sheets.len(), 2);
    }

    #[test]
    fn missing_path_is_reported_with_context() {
        let error = convert_workbook("/nonexistent/book.xlsx", &ConvertOptions::default()).unwrap_err();
        assert_eq!(error.to_string(), "/nonexistent/book.xlsx: Spreadsheet '/nonexistent/book.xlsx' not found");
    }
}
