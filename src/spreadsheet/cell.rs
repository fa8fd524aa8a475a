use crate::error::SheetError;
use crate::helpers::string::unescape_ooxml;
use crate::spreadsheet::shared_strings::SharedStringTable;

/// Declared type of a sheet cell, taken from its `t` attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum CellType {
    /// Numeric literal, also the type of cells without `t`
    #[default]
    Number,
    /// Boolean stored as 0/1
    Boolean,
    /// Text held in the cell itself
    InlineString,
    /// Index into the shared string table
    SharedString,
    /// Cached text result of a formula
    FormulaString,
    /// ISO 8601 date/time
    IsoDateTime,
    /// Error values such as #DIV/0!
    Error,
}

impl CellType {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("s") => CellType::SharedString,
            Some("inlineStr") => CellType::InlineString,
            Some("str") => CellType::FormulaString,
            Some("b") => CellType::Boolean,
            Some("d") => CellType::IsoDateTime,
            Some("e") => CellType::Error,
            _ => CellType::Number,
        }
    }
}

/// Converts the raw content of a cell into its stored value; blank content is no value
pub(crate) fn resolve_value(
    kind: CellType,
    raw: &str,
    shared_strings: &SharedStringTable,
    error_as_null: bool,
) -> Result<Option<String>, SheetError> {
    let value = match kind {
        CellType::SharedString if raw.trim().is_empty() => return Ok(None),
        CellType::SharedString => shared_strings.get(raw.trim().parse()?)?.to_owned(),
        CellType::InlineString | CellType::FormulaString => unescape_ooxml(raw).into_owned(),
        CellType::Boolean => match raw.trim() {
            "1" | "true" => "true".to_owned(),
            "0" | "false" => "false".to_owned(),
            other => other.to_owned(),
        },
        CellType::Error if error_as_null => return Ok(None),
        CellType::Number | CellType::IsoDateTime | CellType::Error => raw.trim().to_owned(),
    };
    Ok(Some(value).filter(|value| !value.is_empty()))
}
