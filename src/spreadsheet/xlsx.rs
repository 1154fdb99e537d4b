use crate::database::value::CellValue;
use crate::database::value::RawGrid;
use crate::error::Sheet2SqlError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Read;
use std::io::Seek;
use tracing::debug;
use tracing::trace;
use zip::ZipArchive;

// XML tag names of the SpreadsheetML parts
const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts");
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");
const TAG_FORMAT_INDEX: QName = QName(b"xf");
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");
const TAG_TEXT: QName = QName(b"t");
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr");
const TAG_SHEET: QName = QName(b"sheet");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

const WORKBOOK_PATH: &str = "xl/workbook.xml";
const WORKBOOK_RELATIONSHIPS_PATH: &str = "xl/_rels/workbook.xml.rels";
const STYLES_PATH: &str = "xl/styles.xml";
const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// An Office Open XML workbook (`.xlsx`, `.xlsm`) opened from any seekable source.
pub struct XlsxWorkbook<R: Read + Seek> {
    /// ZIP archive holding the workbook parts
    zip: ZipArchive<R>,
    /// Cell type per style index
    number_formats: Vec<CellType>,
    /// Shared string table
    shared_strings: Vec<String>,
    /// Worksheets as (name, zip_path) pairs in workbook order
    sheets: Vec<(String, String)>,
}

impl<R: Read + Seek> XlsxWorkbook<R> {
    /// Opens a workbook and loads its sheet list, styles and shared strings.
    pub fn from_reader(reader: R) -> Result<XlsxWorkbook<R>, Sheet2SqlError> {
        let mut zip = ZipArchive::new(reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        let number_formats = load_number_formats(&mut zip, is_1904)?;
        let shared_strings = load_shared_strings(&mut zip)?;
        debug!(
            "Loaded workbook with {} sheets, {} styles and {} shared strings",
            sheets.len(),
            number_formats.len(),
            shared_strings.len()
        );
        Ok(XlsxWorkbook {
            zip,
            number_formats,
            shared_strings,
            sheets,
        })
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Reads a whole sheet into a grid anchored at cell A1.
    ///
    /// Rows run up to the last row holding a value and are padded with nulls
    /// to the widest row.
    pub fn read_grid(&mut self, sheet_name: &str) -> Result<RawGrid, Sheet2SqlError> {
        let zip_path = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, path)| path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFound(sheet_name.to_owned()))?;
        let mut reader = self
            .zip
            .xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;

        let mut cells = Vec::<Cell>::new();
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(number) = event.get_attribute_value("r")? {
                    row_count = number.parse::<usize>()?.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                kind = CellType::from_type_attribute(event.get_attribute_value("t")?.as_deref());
                if let Some(format_id) = event.get_attribute_value("s")? {
                    if kind == CellType::Number && !format_id.is_empty() {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if kind != CellType::Empty && !value.is_empty() {
                    cells.push(Cell {
                        row,
                        col,
                        kind,
                        value: std::mem::take(&mut value),
                    });
                }
                kind = CellType::default();
            }
        });
        drop(reader);

        let grid = self.to_grid(sheet_name, cells)?;
        debug!("Read sheet '{}': {} rows x {} columns", sheet_name, grid.row_count(), grid.col_count());
        Ok(grid)
    }

    /// Places converted cells on a dense grid, dropping trailing rows without values.
    fn to_grid(&self, sheet_name: &str, cells: Vec<Cell>) -> Result<RawGrid, Sheet2SqlError> {
        let mut values = Vec::with_capacity(cells.len());
        for cell in cells {
            let value = cell.to_value(&self.shared_strings).map_err(|message| {
                SpreadsheetError::CellValueError(sheet_name.to_owned(), cell.reference(), message)
            })?;
            if !value.is_null() {
                values.push((cell.row, cell.col, value));
            }
        }

        let row_count = values.iter().map(|(row, _, _)| row + 1).max().unwrap_or(0);
        let col_count = values.iter().map(|(_, col, _)| col + 1).max().unwrap_or(0);
        let mut rows = vec![vec![CellValue::Null; col_count]; row_count];
        for (row, col, value) in values {
            rows[row][col] = value;
        }
        Ok(RawGrid::new(rows))
    }
}

/// Loads the worksheet list and the date system from `xl/workbook.xml`.
fn load_workbook<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<(Vec<(String, String)>, bool), Sheet2SqlError> {
    let relationships = load_relationships(zip, WORKBOOK_RELATIONSHIPS_PATH)?;
    let mut reader = zip
        .xml_reader(WORKBOOK_PATH)?
        .ok_or_else(|| SpreadsheetError::FileError(WORKBOOK_PATH.to_owned()))?;
    let mut sheets = Vec::<(String, String)>::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let name = event.get_attribute_value("name")?;
            let id = event.get_attribute_value("id")?;
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(id.as_ref()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value == "1" || value == "true")
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Maps worksheet relationship ids to zip paths.
fn load_relationships<R: Read + Seek>(zip: &mut ZipArchive<R>, path: &str) -> Result<HashMap<String, String>, Sheet2SqlError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_owned()))?;
    let mut relationships = HashMap::<String, String>::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Loads the cell type of every cell style from `xl/styles.xml`.
fn load_number_formats<R: Read + Seek>(zip: &mut ZipArchive<R>, is_1904: bool) -> Result<Vec<CellType>, Sheet2SqlError> {
    let mut reader = match zip.xml_reader(STYLES_PATH)? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), CellType::parse_custom_number_format(&format, is_1904));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = false,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?;
            format_indexes.push(id.map(|id| id.to_string()).unwrap_or_default());
        }
    });

    let number_formats = format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect::<Vec<_>>();
    trace!("Style cell types: {:?}", number_formats);
    Ok(number_formats)
}

/// Loads the shared string table, an empty table when the part is absent.
fn load_shared_strings<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<String>, Sheet2SqlError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader(SHARED_STRINGS_PATH)? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Collects the text up to `end_tag`, skipping phonetic runs (`<rPh>`).
fn read_string_value<B: BufRead>(
    reader: &mut XmlReader<B>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, Sheet2SqlError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = is_text_content,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

/// Resolves a relationship target against the `xl/` folder.
fn to_zip_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_owned()
    } else if path.starts_with("xl/") {
        path.to_owned()
    } else {
        format!("xl/{path}")
    }
}
