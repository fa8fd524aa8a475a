//! # Spreadsheet Import
//!
//! Imports one sheet of a zip-packaged SpreadsheetML workbook (`.xlsx`, `.xlsm`, `.xltx`,
//! `.xltm`, `.xlam`) into an in-memory [`TabularDatabase`], and traverses that database in
//! logical order even when its storage order disagrees.
//!
//! ## Features
//!
//! - **Relationship-driven part resolution**: the workbook manifest, worksheets and the shared
//!   string table are found through the package relationships, not fixed paths
//! - **Charset detection**: byte-order marks and XML declarations are honored per part; the
//!   archive is reopened when the workbook turns out to use a different charset
//! - **Sheet selection**: by name, glob pattern or 1-based position
//! - **Header handling**: the first row names the columns, or names are generated
//! - **Custom data ranges**: restrict rows and columns with Excel-style ranges and row limits
//! - **Deferred diagnostics**: values that cannot be stored verbatim are reported as warnings
//!   after a successful import, never as failures
//! - **Ordered traversal**: [`OrderedEnumerator`] yields logical positions `1..=n` in order and
//!   reports gaps as [`Entry::Missing`]
//!
//! ## Example
//!
//! ```no_run
//! use sheet_import::{DataImporter, ImportConfig, SheetSelector, XlsxImporter};
//!
//! let config = ImportConfig::default().with_sheet(SheetSelector::Name("Data".to_owned()));
//! let mut importer = XlsxImporter::new(config);
//! let outcome = importer.import_data("book.xlsx")?;
//! for header in outcome.database.headers().filter_map(|entry| entry.get()) {
//!     println!("{}", header.name());
//! }
//! # Ok::<(), sheet_import::ImportError>(())
//! ```

mod error;
mod helpers;
mod warning;

pub mod database;
pub mod spreadsheet;

pub use crate::database::column::ColumnType;
pub use crate::database::column::Header;
pub use crate::database::enumerator::Entry;
pub use crate::database::enumerator::Indexed;
pub use crate::database::enumerator::OrderedEnumerator;
pub use crate::database::range::Range;
pub use crate::database::range::RangeError;
pub use crate::database::row::Row;
pub use crate::database::table::TabularDatabase;
pub use crate::error::ErrorKind;
pub use crate::error::ImportError;
pub use crate::spreadsheet::config::ConfigError;
pub use crate::spreadsheet::config::ImportConfig;
pub use crate::spreadsheet::config::SheetSelector;
pub use crate::spreadsheet::workbook::SheetDescriptor;
pub use crate::spreadsheet::xlsx::XlsxImporter;
pub use crate::spreadsheet::DataImporter;
pub use crate::spreadsheet::ImportFormat;
pub use crate::spreadsheet::ImportOutcome;
pub use crate::spreadsheet::Importer;
pub use crate::warning::ImportWarning;
pub use crate::warning::WarningKind;
