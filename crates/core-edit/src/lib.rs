//! Edit buffer and incremental line renderer.
//!
//! [`EditBuffer`] owns the line being composed as a growable sequence of
//! `{char, width}` cells and keeps three coordinate systems consistent after
//! every mutation: the logical cursor index, the per-cell on-screen width
//! recorded at last paint (tabs expand, control characters caret-render as
//! two columns), and the absolute screen column of the cursor.
//!
//! Invariants, checked by the unit tests after every operation:
//! - `0 <= cursor <= len`
//! - `column == sum(width of cells[0..cursor])`
//! - `last_column >= column` after every repaint
//!
//! The repaint algorithm is incremental: it paints from the cursor to the end
//! of the line, pads with spaces when the content shrank (then lowers
//! `last_column`), and walks the terminal cursor back to its target column
//! with backspaces. It never repaints the whole line for a simple append, so
//! the cost is O(characters from cursor to end). All output for one repaint
//! is batched into a single terminal write.

use anyhow::Result;
use core_terminal::Terminal;
use core_text::{caret_pair, cell_width, fragment_before, is_word_char};

const BACKSPACE: char = '\u{8}';

#[derive(Debug, Clone, Copy)]
struct Cell {
    ch: char,
    /// Width this cell occupied at last paint; stale until the next repaint
    /// touches it.
    width: u16,
}

#[derive(Debug)]
pub struct EditBuffer {
    cells: Vec<Cell>,
    /// Logical index where the next edit applies.
    cursor: usize,
    /// Absolute screen column of `cursor`.
    column: u16,
    /// Rightmost column ever painted for this line; used to blank stale
    /// trailing glyphs after the content shrinks.
    last_column: u16,
    overwrite: bool,
    word_breaks: Vec<char>,
    /// Fragment between the nearest word break and the cursor, refreshed on
    /// every insert/delete and consumed by tab completion.
    current_word: String,
}

impl EditBuffer {
    pub fn new(word_breaks: Vec<char>) -> Self {
        Self {
            cells: Vec::with_capacity(256),
            cursor: 0,
            column: 0,
            last_column: 0,
            overwrite: false,
            word_breaks,
            current_word: String::new(),
        }
    }

    /// Start a fresh line (new read-line call). Capacity is retained.
    pub fn reset(&mut self, word_breaks: Vec<char>) {
        self.cells.clear();
        self.cursor = 0;
        self.column = 0;
        self.last_column = 0;
        self.overwrite = false;
        self.word_breaks = word_breaks;
        self.current_word.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn column(&self) -> u16 {
        self.column
    }

    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.ch).collect()
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }

    pub fn toggle_overwrite(&mut self) {
        self.overwrite = !self.overwrite;
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    /// Invalidate the cached word (line finished, erased, or cancelled).
    pub fn clear_current_word(&mut self) {
        self.current_word.clear();
    }

    /// Move the logical cursor without emitting terminal output. Only valid
    /// immediately before a `redraw`, which repositions the real cursor.
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.cells.len());
    }

    fn refresh_current_word(&mut self) {
        let chars: Vec<char> = self.cells.iter().map(|c| c.ch).collect();
        self.current_word = fragment_before(&chars, self.cursor, &self.word_breaks);
    }

    /// Repaint from the cursor to the end of the line, recomputing widths
    /// left to right.
    ///
    /// `step` advances the cursor over one freshly painted cell (insert
    /// path); `move_to_end` leaves the cursor at the end of the line.
    /// Otherwise the terminal cursor is walked back to the current column.
    fn repaint(&mut self, term: &mut dyn Terminal, step: bool, move_to_end: bool) -> Result<()> {
        let mut out = String::new();
        let mut posn = self.cursor;
        let mut column = self.column;

        while posn < self.cells.len() {
            let ch = self.cells[posn].ch;
            let width = cell_width(ch, column);
            if ch == '\t' {
                for _ in 0..width {
                    out.push(' ');
                }
            } else if let Some((caret, glyph)) = caret_pair(ch) {
                out.push(caret);
                out.push(glyph);
            } else {
                out.push(ch);
            }
            self.cells[posn].width = width;
            column += width;
            posn += 1;
        }

        // Blank any stale glyphs left behind by a shrink, then settle
        // last_column on the new end of content.
        if column > self.last_column {
            self.last_column = column;
        } else if column < self.last_column {
            let pad = self.last_column - column;
            self.last_column = column;
            for _ in 0..pad {
                out.push(' ');
            }
            column += pad;
        }

        let back = if move_to_end {
            self.cursor = self.cells.len();
            self.column = self.last_column;
            column - self.last_column
        } else if step {
            debug_assert!(self.cursor < self.cells.len());
            self.column += self.cells[self.cursor].width;
            self.cursor += 1;
            column - self.column
        } else {
            column - self.column
        };
        for _ in 0..back {
            out.push(BACKSPACE);
        }

        if !out.is_empty() {
            term.write(&out)?;
        }
        Ok(())
    }

    /// Insert (or overwrite) one character at the cursor and advance over it.
    pub fn insert_char(&mut self, term: &mut dyn Terminal, ch: char) -> Result<()> {
        if self.overwrite && self.cursor < self.cells.len() {
            self.cells[self.cursor] = Cell { ch, width: 0 };
        } else {
            self.cells.insert(self.cursor, Cell { ch, width: 0 });
        }
        self.repaint(term, true, false)?;
        self.refresh_current_word();
        Ok(())
    }

    /// Insert every character of `text` at the cursor (yank, completion).
    pub fn insert_str(&mut self, term: &mut dyn Terminal, text: &str) -> Result<()> {
        for ch in text.chars() {
            self.insert_char(term, ch)?;
        }
        Ok(())
    }

    /// Walk the cursor back over `count` cells using cached widths.
    pub fn go_back(&mut self, term: &mut dyn Terminal, count: usize) -> Result<()> {
        let count = count.min(self.cursor);
        let mut out = String::new();
        for _ in 0..count {
            self.cursor -= 1;
            let width = self.cells[self.cursor].width;
            self.column -= width;
            for _ in 0..width {
                out.push(BACKSPACE);
            }
        }
        if !out.is_empty() {
            term.write(&out)?;
        }
        Ok(())
    }

    /// Remove `count` characters at the cursor; past-the-end is clamped and
    /// a zero-length delete is a no-op.
    pub fn delete(&mut self, term: &mut dyn Terminal, count: usize) -> Result<()> {
        let count = count.min(self.cells.len().saturating_sub(self.cursor));
        if count == 0 {
            return Ok(());
        }
        self.cells.drain(self.cursor..self.cursor + count);
        self.repaint(term, false, false)?;
        self.refresh_current_word();
        Ok(())
    }

    /// Delete the character before the cursor, if any.
    pub fn backspace(&mut self, term: &mut dyn Terminal) -> Result<()> {
        if self.cursor > 0 {
            self.go_back(term, 1)?;
            self.delete(term, 1)?;
        }
        Ok(())
    }

    /// Delete the character under the cursor, if any.
    pub fn delete_at_cursor(&mut self, term: &mut dyn Terminal) -> Result<()> {
        self.delete(term, 1)
    }

    pub fn move_left(&mut self, term: &mut dyn Terminal) -> Result<()> {
        if self.cursor > 0 {
            self.go_back(term, 1)?;
        }
        Ok(())
    }

    pub fn move_right(&mut self, term: &mut dyn Terminal) -> Result<()> {
        if self.cursor < self.cells.len() {
            self.repaint(term, true, false)?;
        }
        Ok(())
    }

    pub fn move_home(&mut self, term: &mut dyn Terminal) -> Result<()> {
        let n = self.cursor;
        self.go_back(term, n)
    }

    pub fn move_end(&mut self, term: &mut dyn Terminal) -> Result<()> {
        self.repaint(term, false, true)
    }

    /// Skip separators then a run of word characters, rightward.
    pub fn move_word_forward(&mut self, term: &mut dyn Terminal) -> Result<()> {
        while self.cursor < self.cells.len() && !is_word_char(self.cells[self.cursor].ch) {
            self.move_right(term)?;
        }
        while self.cursor < self.cells.len() && is_word_char(self.cells[self.cursor].ch) {
            self.move_right(term)?;
        }
        Ok(())
    }

    /// Skip separators then a run of word characters, leftward.
    pub fn move_word_backward(&mut self, term: &mut dyn Terminal) -> Result<()> {
        while self.cursor > 0 && !is_word_char(self.cells[self.cursor - 1].ch) {
            self.move_left(term)?;
        }
        while self.cursor > 0 && is_word_char(self.cells[self.cursor - 1].ch) {
            self.move_left(term)?;
        }
        Ok(())
    }

    fn span_text(&self, start: usize, end: usize) -> String {
        self.cells[start..end].iter().map(|c| c.ch).collect()
    }

    /// Erase from the line start to the cursor; returns the killed span.
    pub fn erase_to_start(&mut self, term: &mut dyn Terminal) -> Result<Option<String>> {
        if self.cursor == 0 {
            return Ok(None);
        }
        let count = self.cursor;
        let killed = self.span_text(0, count);
        self.go_back(term, count)?;
        self.delete(term, count)?;
        Ok(Some(killed))
    }

    /// Erase from the cursor to the end of the line; returns the killed span
    /// (possibly empty, which still overwrites the caller's yank slot).
    pub fn erase_to_end(&mut self, term: &mut dyn Terminal) -> Result<String> {
        let killed = self.span_text(self.cursor, self.cells.len());
        self.cells.truncate(self.cursor);
        self.repaint(term, false, false)?;
        self.current_word.clear();
        Ok(killed)
    }

    /// Erase the previous whitespace-delimited word (Ctrl-W).
    pub fn erase_word_back(&mut self, term: &mut dyn Terminal) -> Result<Option<String>> {
        let mut start = self.cursor;
        while start > 0 && self.cells[start - 1].ch.is_whitespace() {
            start -= 1;
        }
        while start > 0 && !self.cells[start - 1].ch.is_whitespace() {
            start -= 1;
        }
        self.erase_span_before(term, start)
    }

    /// Erase back to the start of the current alphanumeric word (Alt-Backspace).
    pub fn erase_to_word_start(&mut self, term: &mut dyn Terminal) -> Result<Option<String>> {
        let mut start = self.cursor;
        while start > 0 && !is_word_char(self.cells[start - 1].ch) {
            start -= 1;
        }
        while start > 0 && is_word_char(self.cells[start - 1].ch) {
            start -= 1;
        }
        self.erase_span_before(term, start)
    }

    /// Erase forward to the end of the current alphanumeric word (Alt-D).
    pub fn erase_word_forward(&mut self, term: &mut dyn Terminal) -> Result<Option<String>> {
        let mut end = self.cursor;
        while end < self.cells.len() && !is_word_char(self.cells[end].ch) {
            end += 1;
        }
        while end < self.cells.len() && is_word_char(self.cells[end].ch) {
            end += 1;
        }
        if end == self.cursor {
            return Ok(None);
        }
        let killed = self.span_text(self.cursor, end);
        self.delete(term, end - self.cursor)?;
        Ok(Some(killed))
    }

    fn erase_span_before(
        &mut self,
        term: &mut dyn Terminal,
        start: usize,
    ) -> Result<Option<String>> {
        if start >= self.cursor {
            return Ok(None);
        }
        let count = self.cursor - start;
        let killed = self.span_text(start, self.cursor);
        self.go_back(term, count)?;
        self.delete(term, count)?;
        Ok(Some(killed))
    }

    /// Erase the whole line, leaving the cursor at column zero.
    pub fn clear_line(&mut self, term: &mut dyn Terminal) -> Result<()> {
        let n = self.cursor;
        self.go_back(term, n)?;
        self.cells.clear();
        self.repaint(term, false, false)?;
        self.refresh_current_word();
        Ok(())
    }

    /// Replace the buffer contents with `line` (history recall).
    pub fn set_line(&mut self, term: &mut dyn Terminal, line: &str) -> Result<()> {
        self.clear_line(term)?;
        for ch in line.chars() {
            self.insert_char(term, ch)?;
        }
        Ok(())
    }

    /// Rebuild the painted line from scratch at the current screen position,
    /// restoring the cursor to its logical index. Used after a clear-screen
    /// or an external repaint trigger.
    pub fn redraw(&mut self, term: &mut dyn Terminal) -> Result<()> {
        let text = self.text();
        let saved_cursor = self.cursor;
        let saved_overwrite = self.overwrite;
        self.cells.clear();
        self.cursor = 0;
        self.column = 0;
        self.last_column = 0;
        self.overwrite = false;
        for ch in text.chars() {
            self.insert_char(term, ch)?;
        }
        self.overwrite = saved_overwrite;
        let back = self.cells.len() - saved_cursor.min(self.cells.len());
        self.go_back(term, back)
    }
}
