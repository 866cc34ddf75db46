//! Char-indexed string helpers.
//!
//! All offsets in this crate are Unicode scalar values (chars), never bytes
//! and never UTF-16 code units. Platform layers convert at the boundary.
//! These helpers do the byte/char translation for plain `&str` snapshots.

use std::ops::Range;

/// Length of `s` in chars.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Slice `s` by a char range. Returns `None` if the range is out of bounds
/// or inverted.
pub fn char_slice(s: &str, range: Range<usize>) -> Option<&str> {
    if range.start > range.end {
        return None;
    }
    let start = byte_of_char(s, range.start)?;
    let end = byte_of_char(s, range.end)?;
    Some(&s[start..end])
}

/// Byte offset of the `char_offset`-th char. `char_offset == char_len(s)`
/// maps to `s.len()`.
fn byte_of_char(s: &str, char_offset: usize) -> Option<usize> {
    let mut seen = 0;
    for (byte, _) in s.char_indices() {
        if seen == char_offset {
            return Some(byte);
        }
        seen += 1;
    }
    // One past the last char is the end of the string.
    if char_offset == seen {
        Some(s.len())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_slice_ascii() {
        let s = "The quick brown fox jumps.";
        assert_eq!(char_slice(s, 4..15), Some("quick brown"));
        assert_eq!(char_slice(s, 0..0), Some(""));
        assert_eq!(char_slice(s, 0..26), Some(s));
        assert_eq!(char_slice(s, 0..27), None);
        assert_eq!(char_slice(s, 5..4), None);
    }

    #[test]
    fn test_char_slice_multibyte() {
        // "héllo 🌍" - accent and emoji are multi-byte, single char each
        let s = "h\u{e9}llo \u{1f30d}";
        assert_eq!(char_len(s), 7);
        assert_eq!(char_slice(s, 0..2), Some("h\u{e9}"));
        assert_eq!(char_slice(s, 6..7), Some("\u{1f30d}"));
        assert_eq!(char_slice(s, 7..7), Some(""));
        assert_eq!(char_slice(s, 6..8), None);
    }

    #[test]
    fn test_char_len() {
        assert_eq!(char_len(""), 0);
        assert_eq!(char_len("abc"), 3);
        assert_eq!(char_len("\u{1f30d}\u{1f30d}"), 2);
    }
}
