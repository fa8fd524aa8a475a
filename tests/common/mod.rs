#![allow(dead_code)]

use sheet_import::Entry;
use sheet_import::Indexed;
use sheet_import::TabularDatabase;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
pub const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// In-memory list of archive parts, written out as a zip file on demand
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Standard layout: package rels, workbook, workbook rels and one worksheet per sheet.
    /// The workbook rels always declare a shared string table; add the part separately.
    pub fn workbook(sheets: &[(&str, String)]) -> Package {
        let names: Vec<&str> = sheets.iter().map(|(name, _)| *name).collect();
        let mut package = Package { parts: Vec::new() }
            .with_part("[Content_Types].xml", content_types(sheets.len()))
            .with_part("_rels/.rels", root_relationships("xl/workbook.xml"))
            .with_part("xl/workbook.xml", workbook_xml(&names))
            .with_part(WORKBOOK_RELS, workbook_relationships(sheets.len()));
        for (position, (_, xml)) in sheets.iter().enumerate() {
            package = package.with_part(&format!("xl/worksheets/sheet{}.xml", position + 1), xml.as_str());
        }
        package
    }

    pub fn with_part(mut self, name: &str, content: impl Into<Vec<u8>>) -> Package {
        self.parts.retain(|(part, _)| part != name);
        self.parts.push((name.to_owned(), content.into()));
        self
    }

    pub fn without_part(mut self, name: &str) -> Package {
        self.parts.retain(|(part, _)| part != name);
        self
    }

    pub fn write(&self, dir: &Path, file_name: &str) -> anyhow::Result<PathBuf> {
        let path = dir.join(file_name);
        let mut zip = ZipWriter::new(File::create(&path)?);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, bytes) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
        Ok(path)
    }
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
"#,
    );
    for position in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{position}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

pub fn root_relationships(workbook_part: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="{workbook_part}"/>
</Relationships>"#
    )
}

/// Workbook manifest body without the XML declaration
pub fn workbook_body(names: &[&str]) -> String {
    let mut xml = String::from(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    for (position, name) in names.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{name}" sheetId="{id}" r:id="rId{id}"/>"#,
            id = position + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

pub fn workbook_xml(names: &[&str]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>{}"#,
        workbook_body(names)
    )
}

pub fn workbook_relationships(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for position in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{position}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{position}.xml"/>"#
        ));
    }
    xml.push_str(
        r#"<Relationship Id="rIdStrings" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
    );
    xml.push_str("</Relationships>");
    xml
}

pub fn worksheet(rows: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{rows}</sheetData></worksheet>"#
    )
}

pub fn shared_strings(strings: &[&str]) -> String {
    let items: String = strings
        .iter()
        .map(|text| format!("<si><t>{text}</t></si>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{count}" uniqueCount="{count}">{items}</sst>"#,
        count = strings.len()
    )
}

pub fn inline(reference: &str, text: &str) -> String {
    format!(r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#)
}

pub fn number(reference: &str, value: &str) -> String {
    format!(r#"<c r="{reference}"><v>{value}</v></c>"#)
}

pub fn shared(reference: &str, index: usize) -> String {
    format!(r#"<c r="{reference}" t="s"><v>{index}</v></c>"#)
}

pub fn row(index: usize, cells: &[String]) -> String {
    format!(r#"<row r="{index}">{}</row>"#, cells.concat())
}

/// UTF-16LE bytes with a byte-order mark
pub fn utf16le(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

pub fn header_names(database: &TabularDatabase) -> Vec<String> {
    database
        .headers()
        .filter_map(|entry| entry.get())
        .map(|header| header.name().to_owned())
        .collect()
}

/// Rows in logical order as (index, values); missing rows have no values
pub fn row_values(database: &TabularDatabase) -> Vec<(usize, Vec<Option<String>>)> {
    database
        .rows()
        .map(|entry| match entry {
            Entry::Present(row) => (row.index(), row.cells().to_vec()),
            Entry::Missing(index) => (index, Vec::new()),
        })
        .collect()
}

pub fn text(value: &str) -> Option<String> {
    Some(value.to_owned())
}
