//! Text utilities for cell and shared string content

use regex::Captures;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static ESCAPED_CHARACTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_x([0-9A-Fa-f]{4})_").expect("Hardcode regex pattern"));

/// Replaces `_xHHHH_` escapes with the UTF-16 code unit they stand for.
/// Escapes that do not name a valid scalar value are kept verbatim.
pub(crate) fn unescape_ooxml(text: &str) -> Cow<'_, str> {
    if !text.contains("_x") {
        return Cow::Borrowed(text);
    }
    ESCAPED_CHARACTER.replace_all(text, |captures: &Captures| {
        u32::from_str_radix(&captures[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| captures[0].to_owned())
    })
}

/// Finds the first character that does not survive a round trip through the database verbatim
pub(crate) fn find_incompatible_char(text: &str) -> Option<char> {
    text.chars().find(|&character| is_incompatible(character))
}

fn is_incompatible(character: char) -> bool {
    match character {
        '\t' | '\n' | '\r' => false,
        '\u{FFFD}' | '\u{FFFE}' | '\u{FFFF}' => true,
        _ => character.is_control(),
    }
}
