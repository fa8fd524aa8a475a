//! In-memory tabular model produced by an import and its ordered traversal

pub mod column;
pub mod enumerator;
pub mod range;
pub mod row;
pub mod table;
