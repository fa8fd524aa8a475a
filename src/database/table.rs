use crate::database::column::ColumnType;
use crate::database::column::Header;
use crate::database::enumerator::Indexed;
use crate::database::enumerator::OrderedEnumerator;
use crate::database::row::Row;
use std::collections::HashSet;

/// In-memory table of one imported sheet.
/// Headers and rows are kept in insertion order; each carries its own logical index,
/// so callers read them through [`OrderedEnumerator`] rather than by position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabularDatabase {
    headers: Vec<Header>,
    rows: Vec<Row>,
}

impl TabularDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column definition claiming logical column `index`
    pub fn add_header(&mut self, index: usize, name: impl Into<String>, kind: Option<ColumnType>) {
        self.headers.push(Header::new(index, name, kind));
    }

    /// Appends a row claiming logical row `index`
    pub fn add_row(&mut self, index: usize, cells: Vec<Option<String>>) {
        self.rows.push(Row::new(index, cells));
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> OrderedEnumerator<'_, Header> {
        self.headers_from(0)
    }

    pub fn headers_from(&self, offset: usize) -> OrderedEnumerator<'_, Header> {
        OrderedEnumerator::new(&self.headers, offset)
    }

    pub fn rows(&self) -> OrderedEnumerator<'_, Row> {
        self.rows_from(0)
    }

    pub fn rows_from(&self, offset: usize) -> OrderedEnumerator<'_, Row> {
        OrderedEnumerator::new(&self.rows, offset)
    }

    /// Appends a row without cells for every logical index in `1..=last` that no stored row claims
    pub(crate) fn fill_row_gaps(&mut self, last: usize) {
        let present: HashSet<usize> = self.rows.iter().map(Indexed::index).collect();
        for index in (1..=last).filter(|index| !present.contains(index)) {
            self.rows.push(Row::new(index, Vec::new()));
        }
    }

    /// Drops rows without values and renumbers the rest `1..` in logical order
    pub(crate) fn compact_rows(&mut self) {
        self.rows.retain(|row| !row.is_empty());
        self.rows.sort_by_key(Indexed::index);
        for (position, row) in self.rows.iter_mut().enumerate() {
            row.set_index(position + 1);
        }
    }
}
