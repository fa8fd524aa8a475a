use crate::error::SheetError;
use crate::helpers::string::unescape_ooxml;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::match_xml_events;
use quick_xml::events::Event;
use std::io::BufRead;

// XML tag names, matched by local name
const TAG_SHARED_STRING_ITEM: &[u8] = b"si"; // Shared string table item
const TAG_PHONETIC_TEXT: &[u8] = b"rPh"; // Phonetic text for Asian languages
const TAG_TEXT: &[u8] = b"t"; // Text run

/// Collects the text of a string item: plain `<t>` or rich-text runs, minus phonetic hints
#[derive(Default)]
pub(crate) struct RichText {
    is_phonetic_text: bool,
    is_text: bool,
    text: String,
}

impl RichText {
    pub(crate) fn feed(&mut self, event: &Event<'_>) -> Result<(), SheetError> {
        match event {
            Event::Start(event) if event.local_name().as_ref() == TAG_PHONETIC_TEXT => self.is_phonetic_text = true,
            Event::End(event) if event.local_name().as_ref() == TAG_PHONETIC_TEXT => self.is_phonetic_text = false,
            Event::Start(event) if !self.is_phonetic_text && event.local_name().as_ref() == TAG_TEXT => self.is_text = true,
            Event::End(event) if self.is_text && event.local_name().as_ref() == TAG_TEXT => self.is_text = false,
            Event::Text(event) if self.is_text => self.text.push_bytes_text(event)?,
            Event::CData(event) if self.is_text => self.text.push_str(&event.xml_content()?),
            Event::GeneralRef(event) if self.is_text => self.text.push_bytes_ref(event)?,
            _ => (),
        }
        Ok(())
    }

    /// Returns the collected text and resets the collector
    pub(crate) fn finish(&mut self) -> String {
        self.is_phonetic_text = false;
        self.is_text = false;
        std::mem::take(&mut self.text)
    }
}

/// Deduplicated text values addressed by position
#[derive(Debug, Default)]
pub(crate) struct SharedStringTable {
    strings: Vec<String>,
}

impl From<Vec<String>> for SharedStringTable {
    fn from(strings: Vec<String>) -> Self {
        SharedStringTable { strings }
    }
}

impl SharedStringTable {
    pub(crate) fn parse<R: BufRead>(reader: &mut XmlReader<R>) -> Result<SharedStringTable, SheetError> {
        let mut strings = Vec::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.local_name().as_ref() == TAG_SHARED_STRING_ITEM => {
                strings.push(read_string_item(reader)?);
            }
        });
        Ok(SharedStringTable { strings })
    }

    pub(crate) fn get(&self, index: usize) -> Result<&str, SheetError> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| {
                SheetError::MissingPart(format!(
                    "Shared string {index} is out of bounds, the table holds {} strings",
                    self.strings.len()
                ))
            })
    }

    pub(crate) fn len(&self) -> usize {
        self.strings.len()
    }
}

/// Reads one `<si>` item, leaving the reader after its end tag
fn read_string_item<R: BufRead>(reader: &mut XmlReader<R>) -> Result<String, SheetError> {
    let mut text = RichText::default();
    while let Some(event) = reader.next()? {
        match event {
            Event::End(event) if event.local_name().as_ref() == TAG_SHARED_STRING_ITEM => break,
            event => text.feed(&event)?,
        }
    }
    Ok(unescape_ooxml(&text.finish()).into_owned())
}
