//! Low-level helpers for reading the zip-packaged XML parts of a workbook.
pub(crate) mod encoding;
pub(crate) mod string;
pub(crate) mod xml;
pub(crate) mod zip;
