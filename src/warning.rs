use std::fmt::Display;

/// Why a value was flagged
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// The value contains a character that cannot be stored verbatim
    VerbatimIncompatible { character: char },
}

/// Non-fatal diagnostic collected during an import and reported once it completes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportWarning {
    part: String,
    reference: String,
    kind: WarningKind,
}

impl ImportWarning {
    pub(crate) fn new(part: &str, reference: String, kind: WarningKind) -> Self {
        ImportWarning {
            part: part.to_owned(),
            reference,
            kind,
        }
    }

    /// Archive part holding the flagged value
    pub fn part(&self) -> &str {
        &self.part
    }

    /// A1-style reference of the flagged cell
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn kind(&self) -> &WarningKind {
        &self.kind
    }
}

impl Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            WarningKind::VerbatimIncompatible { character } => write!(
                f,
                "Cell {} in '{}' contains character U+{:04X} that cannot be stored verbatim",
                self.reference,
                self.part,
                *character as u32
            ),
        }
    }
}
