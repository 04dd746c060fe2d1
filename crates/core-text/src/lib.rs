//! Character width and word-boundary rules for the line editor.
//!
//! A single authoritative function, [`cell_width`], decides how many screen
//! columns a character occupies at a given column. Three cases exist:
//!
//! 1. Tab: expands to the next tab stop, `TAB_STOP - (column % TAB_STOP)`
//!    columns (1..=TAB_STOP).
//! 2. Control characters (`< 0x20`) and DEL: rendered in caret notation
//!    (`^A`, `^?`), always two columns.
//! 3. Everything else: `unicode-width`, clamped to at least one column.
//!
//! No caller bypasses `cell_width` for display-width decisions; the repaint
//! code in `core-edit` records its result per cell so cursor walks can be
//! replayed from cached widths without re-deriving them.
//!
//! The word helpers implement the two boundary notions the engine needs: the
//! configurable word-break set used for completion fragments, and the
//! letter-or-digit classification used by word-wise motion and erasure.

use unicode_width::UnicodeWidthChar;

/// Fixed tab stop interval (columns).
pub const TAB_STOP: u16 = 8;

/// Screen columns consumed by `ch` when painted starting at `column`.
pub fn cell_width(ch: char, column: u16) -> u16 {
    if ch == '\t' {
        TAB_STOP - (column % TAB_STOP)
    } else if is_control(ch) {
        2
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(1).max(1) as u16
    }
}

/// True for characters rendered in caret notation.
pub fn is_control(ch: char) -> bool {
    (ch as u32) < 0x20 && ch != '\t' || ch == '\u{7f}'
}

/// The two glyphs of the caret rendering for a control character, or `None`
/// for ordinary characters. DEL renders as `^?`.
pub fn caret_pair(ch: char) -> Option<(char, char)> {
    if ch == '\u{7f}' {
        Some(('^', '?'))
    } else if (ch as u32) < 0x20 && ch != '\t' {
        Some(('^', char::from_u32(ch as u32 + 0x40).unwrap_or('?')))
    } else {
        None
    }
}

/// Word characters for word-wise motion and erasure (letters and digits).
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

/// The word fragment immediately before `cursor`: the run of characters back
/// to the nearest word-break character (exclusive) or the buffer start.
pub fn fragment_before(chars: &[char], cursor: usize, breaks: &[char]) -> String {
    let end = cursor.min(chars.len());
    let mut start = end;
    while start > 0 && !breaks.contains(&chars[start - 1]) {
        start -= 1;
    }
    chars[start..end].iter().collect()
}
