mod common;

use common::*;
use sheet_import::DataImporter;
use sheet_import::ErrorKind;
use sheet_import::ImportConfig;
use sheet_import::Importer;
use sheet_import::SheetSelector;
use sheet_import::WarningKind;
use sheet_import::XlsxImporter;
use std::io::Write;
use std::path::Path;

fn people() -> String {
    worksheet(&[
        row(1, &[inline("A1", "Name"), inline("B1", "Age")]),
        row(2, &[shared("A2", 0), number("B2", "42")]),
    ]
    .concat())
}

fn import(path: &Path, config: ImportConfig) -> Result<sheet_import::ImportOutcome, sheet_import::ImportError> {
    XlsxImporter::new(config).import_data(path)
}

#[test]
fn minimal_archive() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = Package::workbook(&[("Data", people())])
        .with_part(SHARED_STRINGS, shared_strings(&["Alice"]))
        .write(dir.path(), "book.xlsx")?;

    let outcome = import(&path, ImportConfig::default())?;
    assert_eq!(outcome.sheet.name(), "Data");
    assert_eq!(header_names(&outcome.database), vec!["Name", "Age"]);
    assert_eq!(row_values(&outcome.database), vec![(1, vec![text("Alice"), text("42")])]);
    assert!(outcome.warnings.is_empty());
    Ok(())
}

#[test]
fn missing_shared_strings_part_without_references() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sheet = worksheet(&row(1, &[inline("A1", "only"), number("B1", "1")]));
    let path = Package::workbook(&[("Data", sheet)]).write(dir.path(), "book.xlsx")?;

    let outcome = import(&path, ImportConfig::default())?;
    assert_eq!(header_names(&outcome.database), vec!["only", "1"]);
    assert_eq!(outcome.database.row_count(), 0);
    Ok(())
}

#[test]
fn missing_relationships_part() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = Package::workbook(&[("Data", people())])
        .without_part(WORKBOOK_RELS)
        .write(dir.path(), "book.xlsx")?;

    let error = import(&path, ImportConfig::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::PartNotFound);
    assert_eq!(error.part(), Some(WORKBOOK_RELS));
    assert_eq!(error.path(), path.as_path());
    assert!(error.to_string().contains(WORKBOOK_RELS));
    Ok(())
}

#[test]
fn undeclared_sheet_relationship() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = Package::workbook(&[("Data", people())])
        .with_part(WORKBOOK_RELS, workbook_relationships(0))
        .write(dir.path(), "book.xlsx")?;

    let error = import(&path, ImportConfig::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MissingPart);
    assert_eq!(error.part(), Some(WORKBOOK_RELS));
    Ok(())
}

#[test]
fn sheet_relationship_of_another_kind() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let relationships = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chartsheet" Target="chartsheets/sheet1.xml"/>
</Relationships>"#;
    let path = Package::workbook(&[("Chart", people())])
        .with_part(WORKBOOK_RELS, relationships.to_owned())
        .write(dir.path(), "book.xlsx")?;

    let error = import(&path, ImportConfig::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnsupportedFormat);
    Ok(())
}

#[test]
fn sheet_selection() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let data = worksheet(&row(1, &[inline("A1", "data")]));
    let notes = worksheet(&row(1, &[inline("A1", "notes")]));
    let path = Package::workbook(&[("Data", data), ("Notes", notes)]).write(dir.path(), "book.xlsx")?;

    let by_name = ImportConfig::default().with_sheet(SheetSelector::Name("Notes".to_owned()));
    let outcome = import(&path, by_name)?;
    assert_eq!(outcome.sheet.name(), "Notes");
    assert_eq!(outcome.sheet.order(), 2);
    assert_eq!(header_names(&outcome.database), vec!["notes"]);

    let by_index = ImportConfig::default().with_sheet("1".parse()?);
    let outcome = import(&path, by_index)?;
    assert_eq!(outcome.sheet.name(), "Data");
    assert_eq!(header_names(&outcome.database), vec!["data"]);

    let unknown = ImportConfig::default().with_sheet(SheetSelector::Name("Summary".to_owned()));
    let error = import(&path, unknown).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnsupportedFormat);
    Ok(())
}

#[test]
fn utf16_workbook_is_reread_under_its_encoding() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let workbook = utf16le(&format!(
        r#"<?xml version="1.0" encoding="UTF-16" standalone="yes"?>{}"#,
        workbook_body(&["Données"])
    ));
    let sheet = worksheet(&row(1, &[inline("A1", "Prénom")]));
    let path = Package::workbook(&[("unused", sheet)])
        .with_part("xl/workbook.xml", workbook)
        .write(dir.path(), "book.xlsx")?;

    let config = ImportConfig::default().with_sheet(SheetSelector::Name("Données".to_owned()));
    let outcome = import(&path, config)?;
    assert_eq!(outcome.sheet.name(), "Données");
    assert_eq!(header_names(&outcome.database), vec!["Prénom"]);
    Ok(())
}

#[test]
fn declared_single_byte_encoding() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    // 0x01 stands in for the single byte 0xE9 ('é' in windows-1252)
    let workbook: Vec<u8> = format!(
        r#"<?xml version="1.0" encoding="windows-1252"?>{}"#,
        workbook_body(&["R\u{1}sum\u{1}"])
    )
    .into_bytes()
    .into_iter()
    .map(|byte| if byte == 0x01 { 0xE9 } else { byte })
    .collect();
    // no declaration: read under the workbook charset after the reopen
    let strings = b"<sst><si><t>Caf\xE9</t></si></sst>".to_vec();
    let sheet = worksheet(&row(1, &[shared("A1", 0)]));
    let path = Package::workbook(&[("unused", sheet)])
        .with_part("xl/workbook.xml", workbook)
        .with_part(SHARED_STRINGS, strings)
        .write(dir.path(), "book.xlsx")?;

    let config = ImportConfig::default().with_sheet(SheetSelector::Name("Résumé".to_owned()));
    let outcome = import(&path, config)?;
    assert_eq!(outcome.sheet.name(), "Résumé");
    assert_eq!(header_names(&outcome.database), vec!["Café"]);
    Ok(())
}

#[test]
fn encoding_override() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut sheet = b"<worksheet><sheetData><row r=\"1\"><c r=\"A1\" t=\"inlineStr\"><is><t>".to_vec();
    sheet.extend_from_slice(b"\x93quoted\x94");
    sheet.extend_from_slice(b"</t></is></c></row></sheetData></worksheet>");
    let path = Package::workbook(&[("Data", String::new())])
        .with_part("xl/worksheets/sheet1.xml", sheet)
        .write(dir.path(), "book.xlsx")?;

    let config = ImportConfig::default().with_encoding_label("cp1252")?;
    let outcome = import(&path, config)?;
    assert_eq!(header_names(&outcome.database), vec!["\u{201C}quoted\u{201D}"]);
    Ok(())
}

#[test]
fn shared_string_index_out_of_bounds() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sheet = worksheet(&row(1, &[shared("A1", 5)]));
    let path = Package::workbook(&[("Data", sheet)])
        .with_part(SHARED_STRINGS, shared_strings(&["only"]))
        .write(dir.path(), "book.xlsx")?;

    let error = import(&path, ImportConfig::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MissingPart);
    assert_eq!(error.part(), Some("xl/worksheets/sheet1.xml"));
    Ok(())
}

#[test]
fn malformed_sheet() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sheet = worksheet(r#"<row r="1"><c r="A1"><v>1</c></row>"#);
    let path = Package::workbook(&[("Data", sheet)]).write(dir.path(), "book.xlsx")?;

    let error = import(&path, ImportConfig::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MalformedDocument);
    assert_eq!(error.part(), Some("xl/worksheets/sheet1.xml"));
    Ok(())
}

#[test]
fn not_an_archive() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("book.xlsx");
    std::fs::write(&path, "Name,Age\nAlice,42\n")?;
    assert_eq!(import(&path, ImportConfig::default()).unwrap_err().kind(), ErrorKind::Archive);

    let mut file = std::fs::File::create(&path)?;
    file.write_all(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])?;
    file.write_all(&[0; 504])?;
    drop(file);
    let error = import(&path, ImportConfig::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Archive);
    assert!(error.to_string().contains("password protected"));

    let missing = dir.path().join("missing.xlsx");
    assert_eq!(import(&missing, ImportConfig::default()).unwrap_err().kind(), ErrorKind::Archive);
    Ok(())
}

#[test]
fn incompatible_content_is_reported_after_import() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sheet = worksheet(&[row(1, &[inline("A1", "Note")]), row(2, &[shared("A2", 0)])].concat());
    let path = Package::workbook(&[("Data", sheet)])
        .with_part(SHARED_STRINGS, shared_strings(&["tab\tok, form feed_x000C_ not"]))
        .write(dir.path(), "book.xlsx")?;

    let outcome = import(&path, ImportConfig::default())?;
    assert_eq!(row_values(&outcome.database), vec![(1, vec![text("tab\tok, form feed\u{C} not")])]);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].reference(), "A2");
    assert_eq!(outcome.warnings[0].kind(), &WarningKind::VerbatimIncompatible { character: '\u{C}' });

    let quiet = ImportConfig {
        flag_incompatible_content: false,
        ..ImportConfig::default()
    };
    assert!(import(&path, quiet)?.warnings.is_empty());
    Ok(())
}

#[test]
fn ordered_traversal_of_gapped_rows() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sheet = worksheet(
        &[
            row(1, &[inline("A1", "id")]),
            row(2, &[number("A2", "1")]),
            row(5, &[number("A5", "4")]),
        ]
        .concat(),
    );
    let path = Package::workbook(&[("Data", sheet)]).write(dir.path(), "book.xlsx")?;
    let database = import(&path, ImportConfig::default())?.database;

    let expected = vec![
        (1, vec![text("1")]),
        (2, vec![]),
        (3, vec![]),
        (4, vec![text("4")]),
    ];
    assert_eq!(row_values(&database), expected);
    assert_eq!(row_values(&database), expected);
    for offset in 0..database.row_count() {
        let indices: Vec<usize> = database.rows_from(offset).map(|entry| entry.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4], "offset {offset}");
    }
    Ok(())
}

#[test]
fn workbook_outside_default_location() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sheet = worksheet(&row(1, &[inline("A1", "moved")]));
    let relationships = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="../sheets/first.xml"/>
</Relationships>"#;
    let path = Package::workbook(&[])
        .without_part("xl/workbook.xml")
        .without_part(WORKBOOK_RELS)
        .with_part("_rels/.rels", root_relationships("/book/main.xml"))
        .with_part("book/main.xml", workbook_xml(&["Moved"]))
        .with_part("book/_rels/main.xml.rels", relationships)
        .with_part("sheets/first.xml", sheet)
        .write(dir.path(), "book.xlsx")?;

    let outcome = import(&path, ImportConfig::default())?;
    assert_eq!(outcome.sheet.name(), "Moved");
    assert_eq!(header_names(&outcome.database), vec!["moved"]);
    Ok(())
}

#[test]
fn default_workbook_without_package_relationships() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = Package::workbook(&[("Data", people())])
        .without_part("_rels/.rels")
        .with_part(SHARED_STRINGS, shared_strings(&["Alice"]))
        .write(dir.path(), "book.xlsx")?;

    let outcome = import(&path, ImportConfig::default())?;
    assert_eq!(header_names(&outcome.database), vec!["Name", "Age"]);
    Ok(())
}

#[test]
fn part_names_are_case_insensitive() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = Package::workbook(&[("Data", String::new())])
        .without_part("xl/worksheets/sheet1.xml")
        .with_part("XL/Worksheets/Sheet1.XML", people())
        .with_part(SHARED_STRINGS, shared_strings(&["Alice"]))
        .write(dir.path(), "book.xlsx")?;

    let outcome = import(&path, ImportConfig::default())?;
    assert_eq!(row_values(&outcome.database), vec![(1, vec![text("Alice"), text("42")])]);
    Ok(())
}

#[test]
fn importer_dispatch_and_config_override() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = Package::workbook(&[("Data", people())])
        .with_part(SHARED_STRINGS, shared_strings(&["Alice"]))
        .write(dir.path(), "macros.xlsm")?;

    let config = ImportConfig {
        header: false,
        ..ImportConfig::default()
    };
    let mut importer = Importer::for_path(&path, config)?;
    let outcome = importer.import_data(&path)?;
    assert_eq!(header_names(&outcome.database), vec!["column1", "column2"]);
    assert_eq!(outcome.database.row_count(), 2);

    let outcome = importer.import_data_with(&ImportConfig::default(), &path)?;
    assert_eq!(header_names(&outcome.database), vec!["Name", "Age"]);
    assert_eq!(outcome.database.row_count(), 1);
    Ok(())
}

#[test]
fn range_and_row_limit() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sheet = worksheet(
        &[
            row(1, &[inline("A1", "title")]),
            row(3, &[inline("B3", "x"), inline("C3", "y"), inline("D3", "z")]),
            row(4, &[number("B4", "1"), number("C4", "2"), number("D4", "3")]),
            row(5, &[number("B5", "4"), number("C5", "5"), number("D5", "6")]),
            row(6, &[number("B6", "7"), number("C6", "8"), number("D6", "9")]),
        ]
        .concat(),
    );
    let path = Package::workbook(&[("Data", sheet)]).write(dir.path(), "book.xlsx")?;

    let config = ImportConfig {
        rows_limit: Some(2),
        ..ImportConfig::default().with_range("B3:C")?
    };
    let outcome = import(&path, config)?;
    assert_eq!(header_names(&outcome.database), vec!["x", "y"]);
    assert_eq!(
        row_values(&outcome.database),
        vec![(1, vec![text("1"), text("2")]), (2, vec![text("4"), text("5")])]
    );
    Ok(())
}
