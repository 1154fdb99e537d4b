//! Lookup helpers for the parts of an Office Open XML archive.

use crate::error::Sheet2SqlError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Finds an entry by name, ignoring ASCII case and treating `\` as `/`.
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, Sheet2SqlError>;

    /// Opens an entry as an XML event stream.
    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, Sheet2SqlError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, Sheet2SqlError> {
        let pattern = name.replace('\\', "/");
        let path = self
            .file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(file_name))
            .map(str::to_owned);
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(file) => Ok(file),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, Sheet2SqlError> {
        Ok(self.file(name)?.map(|file| XmlReader::new(BufReader::new(file))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive() -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("xl/Workbook.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<workbook/>").unwrap();
        let cursor = writer.finish().unwrap();
        ZipArchive::new(cursor).unwrap()
    }

    #[test]
    fn finds_entries_ignoring_case_and_separator() {
        let mut zip = archive();
        assert!(zip.file("xl/workbook.xml").unwrap().is_some());
        assert!(zip.file("XL\\WORKBOOK.XML").unwrap().is_some());
    }

    #[test]
    fn missing_entry_is_none() {
        let mut zip = archive();
        assert!(zip.file("xl/styles.xml").unwrap().is_none());
        assert!(zip.xml_reader("xl/sharedStrings.xml").unwrap().is_none());
    }
}
