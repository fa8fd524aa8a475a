//! # Spreadsheet import
//!
//! Turns a zip-packaged SpreadsheetML workbook into a [`TabularDatabase`]. The stages run in
//! dependency order: the package relationships lead to the workbook manifest, the manifest
//! lists the sheets, the workbook relationships map the selected sheet to its part, and the
//! sheet data is parsed against the shared string table.

pub(crate) mod cell;
pub mod config;
pub(crate) mod reference;
pub(crate) mod relationships;
pub(crate) mod shared_strings;
pub(crate) mod sheet_data;
pub mod workbook;
pub mod xlsx;

use crate::database::table::TabularDatabase;
use crate::error::ImportError;
use crate::error::SheetError;
use crate::spreadsheet::config::ImportConfig;
use crate::spreadsheet::workbook::SheetDescriptor;
use crate::spreadsheet::xlsx::XlsxImporter;
use crate::warning::ImportWarning;
use std::path::Path;

/// Result of a successful import
#[derive(Debug)]
pub struct ImportOutcome {
    /// Sheet the data was read from
    pub sheet: SheetDescriptor,
    pub database: TabularDatabase,
    /// Non-fatal findings, in document order
    pub warnings: Vec<ImportWarning>,
}

/// Common interface of the file importers
pub trait DataImporter {
    /// Configuration used by [`DataImporter::import_data`]
    fn config(&self) -> &ImportConfig;

    fn import_data_with<P: AsRef<Path>>(
        &mut self,
        config: &ImportConfig,
        source: P,
    ) -> Result<ImportOutcome, ImportError>;

    fn import_data<P: AsRef<Path>>(&mut self, source: P) -> Result<ImportOutcome, ImportError> {
        let config = self.config().clone();
        self.import_data_with(&config, source)
    }
}

/// Supported file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImportFormat {
    /// Office Open XML workbook (.xlsx, .xlsm, .xltx, .xltm, .xlam)
    OfficeOpenXml,
}

impl ImportFormat {
    /// Detects the format from the file extension
    pub fn from_path(path: &Path) -> Option<ImportFormat> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xltx" | "xltm" | "xlam" => Some(ImportFormat::OfficeOpenXml),
            _ => None,
        }
    }
}

/// Importer chosen by format
#[derive(Clone, Debug)]
pub enum Importer {
    OfficeOpenXml(XlsxImporter),
}

impl Importer {
    pub fn for_format(format: ImportFormat, config: ImportConfig) -> Importer {
        match format {
            ImportFormat::OfficeOpenXml => Importer::OfficeOpenXml(XlsxImporter::new(config)),
        }
    }

    /// Picks the importer from the file extension of `path`
    pub fn for_path(path: &Path, config: ImportConfig) -> Result<Importer, ImportError> {
        match ImportFormat::from_path(path) {
            Some(format) => Ok(Importer::for_format(format, config)),
            None => Err(ImportError::new(
                path,
                SheetError::UnsupportedFormat(format!("Cannot detect file format for '{}'", path.display())),
            )),
        }
    }
}

impl DataImporter for Importer {
    fn config(&self) -> &ImportConfig {
        match self {
            Importer::OfficeOpenXml(importer) => importer.config(),
        }
    }

    fn import_data_with<P: AsRef<Path>>(
        &mut self,
        config: &ImportConfig,
        source: P,
    ) -> Result<ImportOutcome, ImportError> {
        match self {
            Importer::OfficeOpenXml(importer) => importer.import_data_with(config, source),
        }
    }
}
