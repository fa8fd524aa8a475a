use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Classes of fatal import failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The container is unreadable, corrupt, encrypted or not a zip archive
    Archive,
    /// A required internal part is absent from the archive
    PartNotFound,
    /// A referenced relationship or shared string index does not exist
    MissingPart,
    /// One of the XML documents is not well-formed
    MalformedDocument,
    /// The workbook declares no sheets, or the requested sheet matches none
    UnsupportedFormat,
}

/// Stage-level error type.
/// Aggregates errors from the standard library, dependencies, and the parsing stages.
#[derive(Error, Debug)]
pub(crate) enum SheetError {
    #[error("{source}")]
    InPart {
        part: String,
        source: Box<SheetError>,
    },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Import stage errors
    #[error("Workbook is password protected or not a zip archive")]
    PasswordProtected,

    #[error("Part '{0}' not found in archive")]
    PartNotFound(String),

    #[error("{0}")]
    MissingPart(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    CellReferenceError(String),
}

impl SheetError {
    /// Maps the error onto the import failure taxonomy.
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            SheetError::InPart { source, .. } => source.kind(),
            SheetError::IoError(_)
            | SheetError::ZipError(_)
            | SheetError::XmlError(quick_xml::Error::Io(_))
            | SheetError::PasswordProtected => ErrorKind::Archive,
            SheetError::PartNotFound(_) => ErrorKind::PartNotFound,
            SheetError::MissingPart(_) => ErrorKind::MissingPart,
            SheetError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            SheetError::ParseIntError(_)
            | SheetError::CellReferenceError(_)
            | SheetError::XmlError(_)
            | SheetError::XmlEncodingError(_)
            | SheetError::XmlAttributeError(_)
            | SheetError::XmlHelperError(_) => ErrorKind::MalformedDocument,
        }
    }
}

/// Attaches the name of the archive part being processed to a failed stage.
pub(crate) trait ResultPart<T> {
    fn in_part(self, part: &str) -> Result<T, SheetError>;
}

impl<T, E: Into<SheetError>> ResultPart<T> for Result<T, E> {
    fn in_part(self, part: &str) -> Result<T, SheetError> {
        self.map_err(|error| SheetError::InPart {
            part: part.to_owned(),
            source: Box::new(error.into()),
        })
    }
}

/// Fatal import failure, carrying the archive path, the offending part and the cause.
#[derive(Error, Debug)]
#[error("Import '{}' failed{}: {source}", .path.display(), part_suffix(.part))]
pub struct ImportError {
    path: PathBuf,
    part: Option<String>,
    kind: ErrorKind,
    source: SheetError,
}

fn part_suffix(part: &Option<String>) -> String {
    part.as_ref()
        .map(|part| format!(" in part '{part}'"))
        .unwrap_or_default()
}

impl ImportError {
    pub(crate) fn new(path: &Path, error: SheetError) -> ImportError {
        let kind = error.kind();
        let mut part = None;
        let mut source = error;
        while let SheetError::InPart { part: inner, source: cause } = source {
            part = Some(inner);
            source = *cause;
        }
        if let SheetError::PartNotFound(name) = &source {
            part.get_or_insert_with(|| name.to_owned());
        }
        ImportError {
            path: path.to_path_buf(),
            part,
            kind,
            source,
        }
    }

    /// Path of the archive being imported.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the archive part that caused the failure, when one is known.
    pub fn part(&self) -> Option<&str> {
        self.part.as_deref()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}
