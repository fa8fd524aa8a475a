use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::row_to_index;
use regex::Captures;
use regex::Regex;
use thiserror::Error;

/// Errors related to Excel-style range parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),

    #[error("Range '{0}' ends before it starts")]
    ReversedError(String),
}

/// Excel-style cell range with optional boundaries, all 1-based and inclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Range {
    /// Lower row bound, None for unbounded
    pub(crate) row_lower_bound: Option<usize>,
    /// Upper row bound, None for unbounded
    pub(crate) row_upper_bound: Option<usize>,
    /// Lower column bound, None for unbounded
    pub(crate) col_lower_bound: Option<usize>,
    /// Upper column bound, None for unbounded
    pub(crate) col_upper_bound: Option<usize>,
}

impl TryFrom<&str> for Range {
    type Error = RangeError;

    /// Parses an Excel-style range string (e.g., "A1", "B2:C5", "A", "1:10").
    /// Supports single cells, ranges, and partial ranges (columns or rows only).
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let pattern = Regex::new(r"^([A-Z]*)(\d*)(:([A-Z]*)(\d*))?$").expect("Hardcode regex pattern");
        let value = value.trim().to_ascii_uppercase();
        let captures = pattern
            .captures(value.as_str())
            .ok_or_else(|| RangeError::FormatError(value.to_owned()))?;
        let bound = |group: usize, convert: fn(&str) -> Option<usize>| -> Result<Option<usize>, RangeError> {
            match non_empty(&captures, group) {
                Some(text) => convert(text)
                    .map(Some)
                    .ok_or_else(|| RangeError::FormatError(value.to_owned())),
                None => Ok(None),
            }
        };
        let range = Range {
            col_lower_bound: bound(1, col_to_index)?,
            row_lower_bound: bound(2, row_to_index)?,
            col_upper_bound: bound(4, col_to_index)?,
            row_upper_bound: bound(5, row_to_index)?,
        };
        if is_reversed(range.row_lower_bound, range.row_upper_bound)
            || is_reversed(range.col_lower_bound, range.col_upper_bound)
        {
            Err(RangeError::ReversedError(value.to_owned()))?
        }
        Ok(range)
    }
}

fn non_empty<'a>(captures: &Captures<'a>, group: usize) -> Option<&'a str> {
    captures
        .get(group)
        .map(|matcher| matcher.as_str())
        .filter(|text| !text.is_empty())
}

fn is_reversed(lower: Option<usize>, upper: Option<usize>) -> bool {
    lower.zip(upper).map(|(lower, upper)| upper < lower).unwrap_or(false)
}

impl Range {
    pub fn row_lower_bound(&self) -> Option<usize> {
        self.row_lower_bound
    }

    pub fn row_upper_bound(&self) -> Option<usize> {
        self.row_upper_bound
    }

    pub fn col_lower_bound(&self) -> Option<usize> {
        self.col_lower_bound
    }

    pub fn col_upper_bound(&self) -> Option<usize> {
        self.col_upper_bound
    }

    /// Checks if a row is before the lower bound.
    pub(crate) fn before_row(&self, row: usize) -> bool {
        self.row_lower_bound
            .map(|row_lower_bound| row < row_lower_bound)
            .unwrap_or(false)
    }

    /// Checks if a row is after the upper bound.
    pub(crate) fn after_row(&self, row: usize) -> bool {
        self.row_upper_bound
            .map(|row_upper_bound| row_upper_bound < row)
            .unwrap_or(false)
    }

    /// Checks if a column lies within the column bounds.
    pub(crate) fn contains_col(&self, col: usize) -> bool {
        let before = self.col_lower_bound.map(|lower| col < lower).unwrap_or(false);
        let after = self.col_upper_bound.map(|upper| upper < col).unwrap_or(false);
        !before && !after
    }

    /// Number of sheet columns left of the range; subtracting it rebases columns to 1.
    pub(crate) fn col_offset(&self) -> usize {
        self.col_lower_bound.unwrap_or(1) - 1
    }
}
