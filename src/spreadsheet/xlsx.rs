use crate::error::ImportError;
use crate::error::ResultPart;
use crate::error::SheetError;
use crate::helpers::zip::ZipPackage;
use crate::spreadsheet::config::ImportConfig;
use crate::spreadsheet::relationships::parent_dir;
use crate::spreadsheet::relationships::relationships_path;
use crate::spreadsheet::relationships::RelationshipMap;
use crate::spreadsheet::relationships::DEFAULT_SHARED_STRINGS;
use crate::spreadsheet::relationships::DEFAULT_WORKBOOK;
use crate::spreadsheet::relationships::KIND_OFFICE_DOCUMENT;
use crate::spreadsheet::relationships::KIND_SHARED_STRINGS;
use crate::spreadsheet::relationships::KIND_WORKSHEET;
use crate::spreadsheet::relationships::ROOT_RELATIONSHIPS;
use crate::spreadsheet::shared_strings::SharedStringTable;
use crate::spreadsheet::sheet_data;
use crate::spreadsheet::workbook;
use crate::spreadsheet::DataImporter;
use crate::spreadsheet::ImportOutcome;
use encoding_rs::UTF_8;
use std::path::Path;

/// Importer for zip-packaged SpreadsheetML workbooks (.xlsx and its macro/template variants)
#[derive(Clone, Debug, Default)]
pub struct XlsxImporter {
    config: ImportConfig,
}

impl XlsxImporter {
    pub fn new(config: ImportConfig) -> Self {
        XlsxImporter { config }
    }
}

impl DataImporter for XlsxImporter {
    fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn import_data_with<P: AsRef<Path>>(
        &mut self,
        config: &ImportConfig,
        source: P,
    ) -> Result<ImportOutcome, ImportError> {
        let path = source.as_ref();
        log::debug!("Import '{}'", path.display());
        let outcome = load(path, config).map_err(|error| ImportError::new(path, error))?;
        for warning in &outcome.warnings {
            log::warn!("{warning}");
        }
        log::info!(
            "Imported sheet '{}' of '{}': {} columns, {} rows, {} warnings",
            outcome.sheet.name(),
            path.display(),
            outcome.database.header_count(),
            outcome.database.row_count(),
            outcome.warnings.len()
        );
        Ok(outcome)
    }
}

/// Runs every stage; nothing built here escapes unless all of them succeed
fn load(path: &Path, config: &ImportConfig) -> Result<ImportOutcome, SheetError> {
    let mut package = ZipPackage::open(path, config.encoding.unwrap_or(UTF_8))?;
    let workbook_part = locate_workbook(&mut package)?;
    if config.encoding.is_none() {
        if let Some(encoding) = package.detect_encoding(&workbook_part).in_part(&workbook_part)? {
            if encoding != package.charset() {
                package.reopen(encoding)?;
            }
        }
    }

    let sheets = {
        let mut reader = package.xml_reader(&workbook_part).in_part(&workbook_part)?;
        workbook::parse(&mut reader).in_part(&workbook_part)?
    };
    let sheet = workbook::select(&sheets, config.sheet.as_ref())?.clone();
    log::debug!("Selected sheet '{}' ({})", sheet.name(), sheet.relationship_id());

    let relationships_part = relationships_path(&workbook_part);
    let (sheet_part, shared_strings_part) = {
        let mut reader = package.xml_reader(&relationships_part).in_part(&relationships_part)?;
        let relationships =
            RelationshipMap::parse(&mut reader, parent_dir(&workbook_part)).in_part(&relationships_part)?;
        log::debug!("Loaded {} relationships from '{relationships_part}'", relationships.len());
        let relationship = relationships
            .resolve(sheet.relationship_id())
            .in_part(&relationships_part)?;
        if !relationship.kind.ends_with(KIND_WORKSHEET) {
            Err(SheetError::UnsupportedFormat(format!(
                "Sheet '{}' is a '{}' part, not a worksheet",
                sheet.name(),
                relationship.kind
            )))?
        }
        let sheet_part = relationship.target.clone();
        let shared_strings_part = relationships
            .find_by_kind(KIND_SHARED_STRINGS)
            .map(|relationship| relationship.target.clone())
            .unwrap_or_else(|| DEFAULT_SHARED_STRINGS.to_owned());
        (sheet_part, shared_strings_part)
    };

    let shared_strings = match package
        .xml_reader_if_exists(&shared_strings_part)
        .in_part(&shared_strings_part)?
    {
        Some(mut reader) => {
            let table = SharedStringTable::parse(&mut reader).in_part(&shared_strings_part)?;
            log::debug!("Loaded {} shared strings from '{shared_strings_part}'", table.len());
            table
        }
        None => {
            log::debug!("No shared string table at '{shared_strings_part}'");
            SharedStringTable::default()
        }
    };

    let mut reader = package.xml_reader(&sheet_part).in_part(&sheet_part)?;
    let (database, warnings) =
        sheet_data::parse(&mut reader, config, &shared_strings, &sheet_part).in_part(&sheet_part)?;
    Ok(ImportOutcome {
        sheet,
        database,
        warnings,
    })
}

/// Follows the package relationships to the workbook manifest
fn locate_workbook(package: &mut ZipPackage) -> Result<String, SheetError> {
    let relationships = match package
        .xml_reader_if_exists(ROOT_RELATIONSHIPS)
        .in_part(ROOT_RELATIONSHIPS)?
    {
        Some(mut reader) => RelationshipMap::parse(&mut reader, "").in_part(ROOT_RELATIONSHIPS)?,
        None => RelationshipMap::default(),
    };
    let workbook_part = relationships
        .find_by_kind(KIND_OFFICE_DOCUMENT)
        .map(|relationship| relationship.target.clone())
        .unwrap_or_else(|| DEFAULT_WORKBOOK.to_owned());
    log::debug!("Workbook manifest at '{workbook_part}'");
    Ok(workbook_part)
}
