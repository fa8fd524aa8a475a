//! Conversions between A1-style cell references and 1-based logical indices

/// Converts column letters to a 1-based column index ("A" → 1, "AA" → 27).
/// Returns None for empty, non-alphabetic or overflowing input.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.bytes().try_fold(0usize, |index, byte| {
        let digit = match byte {
            b'A'..=b'Z' => byte - b'A' + 1,
            b'a'..=b'z' => byte - b'a' + 1,
            _ => return None,
        };
        index.checked_mul(26)?.checked_add(digit as usize)
    })
}

/// Parses a 1-based row number; zero is not a row
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0)
}

/// Extracts only the column part of a reference, which is enough for cells of a known row
pub(crate) fn reference_to_col(reference: &str) -> Option<usize> {
    let letters = reference
        .trim_start_matches('$')
        .split(|character: char| !character.is_ascii_alphabetic())
        .next()?;
    col_to_index(letters)
}

/// Converts a 1-based column index to letters (1 → "A", 27 → "AA")
pub(crate) fn index_to_col(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let remainder = (col - 1) % 26;
        letters.push(b'A' + remainder as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Formats 1-based (row, col) as an A1-style reference
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row)
}
