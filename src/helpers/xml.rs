//! Streaming XML helpers for the workbook parts of an `.xlsx` archive.

use crate::error::Sheet2SqlError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Unknown XML entity '&{0};'")]
    UnknownEntity(String),
}

/// Event reader tuned for spreadsheet parts: empty elements are expanded into
/// start/end pairs and text is kept verbatim.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(source: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        XmlReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Returns the next event, or `None` once the document is exhausted.
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, Sheet2SqlError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }
}

pub(crate) trait XmlNodeHelper<'a> {
    /// Unescaped value of the attribute whose local name is `name`.
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, Sheet2SqlError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, Sheet2SqlError> {
        for attribute in self.attributes() {
            let attribute = attribute?;
            if attribute.key.local_name().as_ref() == name.as_bytes() {
                return Ok(Some(attribute.unescape_value()?));
            }
        }
        Ok(None)
    }
}

pub(crate) trait XmlTextContextHelper {
    /// Appends a character or entity reference (`&#65;`, `&#x41;`, `&amp;`).
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), Sheet2SqlError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), Sheet2SqlError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16)?,
                None => number.parse::<u32>()?,
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::UnknownEntity(raw.to_string()))?;
        }
        Ok(())
    }
}

/// Drives an [`XmlReader`] to the end of its document, dispatching every event
/// to the given match arms and ignoring the rest.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_text(xml: &str) -> Result<String, Sheet2SqlError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_str(&event.xml_content()?),
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        Ok(text)
    }

    #[test]
    fn resolves_entities_and_character_references() {
        let text = collect_text("<t>Tom &amp; Jerry &#65;&#x42;</t>").unwrap();
        assert_eq!(text, "Tom & Jerry AB");
    }

    #[test]
    fn rejects_unknown_entity() {
        assert!(collect_text("<t>&nope;</t>").is_err());
    }

    #[test]
    fn reads_attribute_by_local_name() -> Result<(), Sheet2SqlError> {
        let mut reader = XmlReader::new(r#"<sheet name="Data" r:id="rId1"/>"#.as_bytes());
        let mut found = Vec::new();
        match_xml_events!(reader => {
            Event::Start(event) => {
                found.push(event.get_attribute_value("name")?.map(|it| it.to_string()));
                found.push(event.get_attribute_value("id")?.map(|it| it.to_string()));
                found.push(event.get_attribute_value("missing")?.map(|it| it.to_string()));
            }
        });
        assert_eq!(found, vec![Some("Data".to_string()), Some("rId1".to_string()), None]);
        Ok(())
    }
}
