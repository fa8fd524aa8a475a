use crate::database::enumerator::Indexed;
use crate::spreadsheet::cell::CellType;

/// Type hints inferred for imported columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Boolean values (true/false)
    Boolean,
    /// 64-bit signed integers
    BigInt,
    /// Double-precision floating point numbers
    Double,
    /// Variable-length strings
    Varchar,
    /// ISO 8601 date and time
    Timestamp,
}

impl ColumnType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::BigInt => "bigint",
            ColumnType::Double => "double",
            ColumnType::Varchar => "varchar",
            ColumnType::Timestamp => "timestamp",
        }
    }

    /// Infers the type of a single cell from its declared kind and raw value.
    /// Error cells carry no type.
    pub(crate) fn from(cell_type: CellType, value: &str) -> Option<Self> {
        match cell_type {
            CellType::Boolean => Some(ColumnType::Boolean),
            CellType::Number if Self::is_integer(value) => Some(ColumnType::BigInt),
            CellType::Number => Some(ColumnType::Double),
            CellType::IsoDateTime => Some(ColumnType::Timestamp),
            CellType::InlineString | CellType::SharedString | CellType::FormulaString => Some(ColumnType::Varchar),
            CellType::Error => None,
        }
    }

    /// Folds another cell type into the column type.
    /// Integers widen to doubles; any other disagreement falls back to VARCHAR.
    pub(crate) fn merge(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (left, right) if left == right => left,
            (ColumnType::BigInt, ColumnType::Double) | (ColumnType::Double, ColumnType::BigInt) => ColumnType::Double,
            _ => ColumnType::Varchar,
        }
    }

    /// Checks if a numeric string represents an integer value.
    /// Returns true if the decimal part contains only zeros or no decimal point.
    fn is_integer(value: &str) -> bool {
        let digits = value.strip_prefix('-').unwrap_or(value);
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        !whole.is_empty()
            && whole.bytes().all(|byte| byte.is_ascii_digit())
            && fraction.bytes().all(|byte| byte == b'0')
    }
}

/// Column definition: logical position, name and inferred type
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    index: usize,
    name: String,
    kind: Option<ColumnType>,
}

impl Header {
    pub fn new(index: usize, name: impl Into<String>, kind: Option<ColumnType>) -> Self {
        Header {
            index,
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type hint, None when the column holds no typed value
    pub fn kind(&self) -> Option<ColumnType> {
        self.kind
    }
}

impl Indexed for Header {
    fn index(&self) -> usize {
        self.index
    }
}
