//! Character encoding detection for XML parts.
//! Inspects the byte-order mark or the XML declaration through the reader's buffer without consuming it.

use encoding_rs::Encoding;
use encoding_rs::UTF_16BE;
use encoding_rs::UTF_16LE;
use regex::bytes::Regex;
use std::io::BufRead;

const UTF_8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Detects the encoding of the buffered stream, leaving the stream position untouched.
/// Returns `None` when neither a byte-order mark nor a usable declaration is present.
pub(crate) fn detect<R: BufRead>(reader: &mut R) -> std::io::Result<Option<&'static Encoding>> {
    let prefix = reader.fill_buf()?;
    Ok(detect_bytes(prefix))
}

/// Detects the encoding from the leading bytes of a document.
pub(crate) fn detect_bytes(prefix: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(prefix) {
        return Some(encoding);
    }
    match prefix {
        // a document starts with '<', so a zero byte next to it means two-byte units
        [0x3C, 0x00, ..] => Some(UTF_16LE),
        [0x00, 0x3C, ..] => Some(UTF_16BE),
        _ => declared_encoding(prefix),
    }
}

/// Reads `encoding="..."` from an XML declaration.
/// Two-byte labels are ignored: bytes readable as ASCII contradict them.
fn declared_encoding(prefix: &[u8]) -> Option<&'static Encoding> {
    let declaration = prefix.strip_prefix(b"<?xml")?;
    let end = declaration.windows(2).position(|window| window == b"?>")?;
    let pattern = Regex::new(r#"encoding\s*=\s*["']([A-Za-z0-9._:\-]+)["']"#).expect("Hardcode regex pattern");
    let label = pattern.captures(&declaration[..end])?.get(1)?;
    Encoding::for_label(label.as_bytes()).filter(|encoding| encoding.is_ascii_compatible())
}

/// Consumes a leading UTF-8 byte-order mark, if any.
pub(crate) fn skip_utf8_bom<R: BufRead>(reader: &mut R) -> std::io::Result<()> {
    if reader.fill_buf()?.starts_with(UTF_8_BOM) {
        reader.consume(UTF_8_BOM.len());
    }
    Ok(())
}

/// Resolves a user supplied charset name.
/// Accepts WHATWG labels ("utf-8", "shift_jis", "latin1") and Windows code pages ("932", "cp1252").
pub(crate) fn resolve_label(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    Encoding::for_label(label.as_bytes()).or_else(|| {
        let number = match label.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("cp") => &label[2..],
            _ => label,
        };
        number.parse::<u16>().ok().and_then(codepage::to_encoding)
    })
}
