use crate::database::enumerator::Indexed;

/// One data row; `cells[n]` holds the value of logical column `n + 1`.
/// Rows the sheet omits carry no cells at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    index: usize,
    cells: Vec<Option<String>>,
}

impl Row {
    pub fn new(index: usize, cells: Vec<Option<String>>) -> Self {
        Row { index, cells }
    }

    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    /// Value at a 1-based logical column, None when the cell is empty or absent
    pub fn value(&self, col: usize) -> Option<&str> {
        col.checked_sub(1)
            .and_then(|position| self.cells.get(position))
            .and_then(|cell| cell.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }
}

impl Indexed for Row {
    fn index(&self) -> usize {
        self.index
    }
}
