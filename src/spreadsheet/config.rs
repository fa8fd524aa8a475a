use crate::database::range::Range;
use crate::database::range::RangeError;
use crate::helpers::encoding::resolve_label;
use encoding_rs::Encoding;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building an import configuration from user input
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Identifies the sheet to import
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetSelector {
    /// Exact sheet name, or a glob pattern when no name matches exactly
    Name(String),
    /// 1-based position in declaration order
    Index(usize),
}

impl FromStr for SheetSelector {
    type Err = ConfigError;

    /// All-digit input selects by position, anything else by name
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            Err(ConfigError::InvalidParameter {
                name: "sheet".to_owned(),
                message: "sheet selector is empty".to_owned(),
            })
        } else if value.bytes().all(|byte| byte.is_ascii_digit()) {
            match value.parse::<usize>() {
                Ok(index) if index > 0 => Ok(SheetSelector::Index(index)),
                _ => Err(ConfigError::InvalidParameter {
                    name: "sheet".to_owned(),
                    message: format!("'{value}' is not a 1-based sheet index"),
                }),
            }
        } else {
            Ok(SheetSelector::Name(value.to_owned()))
        }
    }
}

impl Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Name(name) => write!(f, "'{name}'"),
            SheetSelector::Index(index) => write!(f, "#{index}"),
        }
    }
}

/// Settings threaded through every import stage. Never mutated once an import starts.
#[derive(Clone, Debug)]
pub struct ImportConfig {
    /// Sheet to import; the first declared sheet when absent
    pub sheet: Option<SheetSelector>,

    /// Record values that cannot be stored verbatim as warnings
    pub flag_incompatible_content: bool,

    /// Charset forced for part names and parts without their own marker.
    /// Detected from the workbook part when absent.
    pub encoding: Option<&'static Encoding>,

    /// Treat the first row as column names
    pub header: bool,

    /// Data range within the sheet
    pub range: Option<Range>,

    /// Maximum number of data rows to read
    pub rows_limit: Option<usize>,

    /// Drop rows without any value and compact the row indices
    pub skip_empty_rows: bool,

    /// Import error cells as missing values instead of their error text
    pub error_as_null: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            sheet: None,
            flag_incompatible_content: true,
            encoding: None,
            header: true,
            range: None,
            rows_limit: None,
            skip_empty_rows: false,
            error_as_null: false,
        }
    }
}

impl ImportConfig {
    pub fn with_sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = Some(sheet);
        self
    }

    /// Forces a charset given as a WHATWG label ("windows-1252") or a Windows code page ("932", "cp1252")
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self, ConfigError> {
        let encoding = resolve_label(label).ok_or_else(|| ConfigError::InvalidParameter {
            name: "encoding".to_owned(),
            message: format!("'{label}' is not a known encoding"),
        })?;
        self.encoding = Some(encoding);
        Ok(self)
    }

    pub fn with_range(mut self, range: &str) -> Result<Self, ConfigError> {
        self.range = Some(Range::try_from(range)?);
        Ok(self)
    }
}
