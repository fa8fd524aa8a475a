//! Traversal of headers and rows in logical-index order.
//!
//! Storage order and logical order may diverge after import quirks or manual edits.
//! The enumerator always yields logical positions `1..=len` in ascending order: each
//! position resolves to the first stored element claiming it, searched from the current
//! cursor to the end and then wrapping around, or to [`Entry::Missing`] when no element
//! claims it.

use std::iter::FusedIterator;

/// Element carrying an explicit 1-based logical index
pub trait Indexed {
    fn index(&self) -> usize;
}

/// One logical position of a traversal
#[derive(Debug, PartialEq)]
pub enum Entry<'a, T> {
    Present(&'a T),
    /// No stored element claims this logical index
    Missing(usize),
}

impl<T> Clone for Entry<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Entry<'_, T> {}

impl<'a, T: Indexed> Entry<'a, T> {
    /// Logical index of this position
    pub fn index(&self) -> usize {
        match self {
            Entry::Present(item) => item.index(),
            Entry::Missing(index) => *index,
        }
    }

    pub fn get(&self) -> Option<&'a T> {
        match *self {
            Entry::Present(item) => Some(item),
            Entry::Missing(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Entry::Missing(_))
    }
}

/// Ordered, self-healing iterator over a backing container
#[derive(Clone, Debug)]
pub struct OrderedEnumerator<'a, T> {
    items: &'a [T],
    offset: usize,
    produced: usize,
}

impl<'a, T: Indexed> OrderedEnumerator<'a, T> {
    /// Starts a traversal; the search cursor begins `offset` storage positions in.
    /// Offsets outside the container fall back to 0.
    pub fn new(items: &'a [T], offset: usize) -> Self {
        let offset = if offset < items.len() { offset } else { 0 };
        OrderedEnumerator {
            items,
            offset,
            produced: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.produced < self.items.len()
    }

    fn locate(&self, target: usize) -> Option<&'a T> {
        let items = self.items;
        let split = (self.produced + self.offset).min(items.len());
        items[split..]
            .iter()
            .find(|item| item.index() == target)
            .or_else(|| items[..split].iter().find(|item| item.index() == target))
    }
}

impl<'a, T: Indexed> Iterator for OrderedEnumerator<'a, T> {
    type Item = Entry<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        let target = self.produced + 1;
        let entry = match self.locate(target) {
            Some(item) => Entry::Present(item),
            None => Entry::Missing(target),
        };
        self.produced += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len() - self.produced;
        (remaining, Some(remaining))
    }
}

impl<T: Indexed> ExactSizeIterator for OrderedEnumerator<'_, T> {}

impl<T: Indexed> FusedIterator for OrderedEnumerator<'_, T> {}
