//! Scroll-back history store with browse state and file persistence.
//!
//! Entries are held oldest-first internally and addressed newest-first by
//! index (`get(0)` is the most recent). Capacity 0 means unbounded; a bounded
//! store evicts its oldest entry on overflow. Nothing is committed
//! automatically: the caller decides which finished lines enter history.
//!
//! Browsing keeps a draft of the in-progress line. The first `browse_up`
//! captures the live buffer and jumps to the newest entry; `browse_down` past
//! the newest restores the draft and leaves browse mode. Stepping past either
//! end is a boundary, not an error; the caller beeps.
//!
//! Persistence is plain text, one entry per line, oldest first, no escaping
//! (embedded newlines are not representable). Load replaces the store only
//! after the file has been read successfully; save overwrites destructively.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file not found: {0}")]
    NotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One step of history browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Browse {
    /// The line to place into the edit buffer.
    Line(String),
    /// Already at the oldest (up) or not browsing (down); nothing changes.
    Boundary,
}

#[derive(Debug, Default)]
pub struct HistoryStore {
    /// Oldest-first.
    entries: Vec<String>,
    /// 0 = unbounded.
    max_size: usize,
    /// Newest-first browse position; `None` when editing a fresh line.
    browse: Option<usize>,
    /// The live line captured when browsing began.
    draft: String,
}

impl HistoryStore {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    /// Append a line, evicting the oldest entry at capacity.
    pub fn commit(&mut self, line: &str) {
        if self.max_size != 0 && self.entries.len() == self.max_size {
            self.entries.remove(0);
        }
        self.entries.push(line.to_string());
    }

    /// Append unless equal to the most recently committed entry.
    pub fn commit_unique(&mut self, line: &str) {
        if self.entries.last().is_none_or(|last| last != line) {
            self.commit(line);
        }
    }

    /// Entry by newest-first index; empty string when out of range.
    pub fn get(&self, index_from_newest: usize) -> &str {
        self.entries
            .len()
            .checked_sub(index_from_newest + 1)
            .and_then(|i| self.entries.get(i))
            .map_or("", String::as_str)
    }

    /// Replace the entry at a newest-first index; out of range is a no-op.
    pub fn set(&mut self, index_from_newest: usize, line: &str) {
        if let Some(i) = self.entries.len().checked_sub(index_from_newest + 1) {
            self.entries[i] = line.to_string();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.browse = None;
    }

    /// Step to an older entry. The first call captures `live` as the draft.
    pub fn browse_up(&mut self, live: &str) -> Browse {
        match self.browse {
            None => {
                if self.entries.is_empty() {
                    return Browse::Boundary;
                }
                self.draft = live.to_string();
                self.browse = Some(0);
                Browse::Line(self.get(0).to_string())
            }
            Some(pos) if pos + 1 < self.entries.len() => {
                self.browse = Some(pos + 1);
                Browse::Line(self.get(pos + 1).to_string())
            }
            Some(_) => Browse::Boundary,
        }
    }

    /// Step to a newer entry; past the newest restores the draft.
    pub fn browse_down(&mut self) -> Browse {
        match self.browse {
            Some(0) => {
                self.browse = None;
                Browse::Line(self.draft.clone())
            }
            Some(pos) => {
                self.browse = Some(pos - 1);
                Browse::Line(self.get(pos - 1).to_string())
            }
            None => Browse::Boundary,
        }
    }

    /// Leave browse mode without touching entries (new line started).
    pub fn reset_browse(&mut self) {
        self.browse = None;
        self.draft.clear();
    }

    /// Replace the whole store from a newline-delimited file, oldest line
    /// first. The store is cleared only after the file has been read.
    pub fn load(&mut self, path: &Path) -> Result<(), HistoryError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(HistoryError::NotFound(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };
        self.clear();
        for line in content.lines() {
            self.commit(line);
        }
        debug!(target: "history", file = %path.display(), entries = self.entries.len(), "history_loaded");
        Ok(())
    }

    /// Write all entries oldest-first, newline-terminated, overwriting any
    /// existing file.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let mut out = String::new();
        for line in &self.entries {
            out.push_str(line);
            out.push('\n');
        }
        fs::write(path, out)?;
        debug!(target: "history", file = %path.display(), entries = self.entries.len(), "history_saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_newest_first_and_total_for_out_of_range() {
        let mut h = HistoryStore::new(0);
        h.commit("a");
        h.commit("b");
        h.commit("c");
        assert_eq!(h.get(0), "c");
        assert_eq!(h.get(1), "b");
        assert_eq!(h.get(2), "a");
        assert_eq!(h.get(3), "");
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut h = HistoryStore::new(2);
        h.commit("x");
        h.commit("y");
        h.commit("z");
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(0), "z");
        assert_eq!(h.get(1), "y");
        assert_eq!(h.get(2), "");
    }

    #[test]
    fn commit_unique_skips_immediate_duplicate() {
        let mut h = HistoryStore::new(0);
        h.commit_unique("ls");
        h.commit_unique("ls");
        h.commit_unique("pwd");
        h.commit_unique("ls");
        assert_eq!(h.len(), 3);
        assert_eq!(h.get(0), "ls");
        assert_eq!(h.get(1), "pwd");
    }

    #[test]
    fn set_replaces_by_newest_first_index() {
        let mut h = HistoryStore::new(0);
        h.commit("a");
        h.commit("b");
        h.set(0, "B");
        h.set(5, "ignored");
        assert_eq!(h.get(0), "B");
        assert_eq!(h.get(1), "a");
    }

    #[test]
    fn browse_up_captures_draft_and_stops_at_oldest() {
        let mut h = HistoryStore::new(0);
        h.commit("first");
        h.commit("second");
        assert_eq!(h.browse_up("draft"), Browse::Line("second".into()));
        assert_eq!(h.browse_up("draft"), Browse::Line("first".into()));
        // At the oldest entry every further step is a boundary no-op.
        assert_eq!(h.browse_up("draft"), Browse::Boundary);
        assert_eq!(h.browse_up("draft"), Browse::Boundary);
    }

    #[test]
    fn browse_down_restores_draft_then_bounds() {
        let mut h = HistoryStore::new(0);
        h.commit("only");
        assert_eq!(h.browse_up("work in progress"), Browse::Line("only".into()));
        assert_eq!(h.browse_down(), Browse::Line("work in progress".into()));
        assert_eq!(h.browse_down(), Browse::Boundary);
    }

    #[test]
    fn browse_up_on_empty_history_is_boundary() {
        let mut h = HistoryStore::new(0);
        assert_eq!(h.browse_up("live"), Browse::Boundary);
    }

    #[test]
    fn save_then_load_round_trips_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut h = HistoryStore::new(0);
        h.commit("a");
        h.commit("b");
        h.commit("c");
        h.save(&path).unwrap();

        let mut reloaded = HistoryStore::new(0);
        reloaded.load(&path).unwrap();
        assert_eq!(reloaded.get(0), "c");
        assert_eq!(reloaded.get(1), "b");
        assert_eq!(reloaded.get(2), "a");
    }

    #[test]
    fn save_writes_oldest_first_plain_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut h = HistoryStore::new(0);
        h.commit("old");
        h.commit("new");
        h.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn load_missing_file_is_distinct_error_and_preserves_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let mut h = HistoryStore::new(0);
        h.commit("keep me");
        match h.load(&path) {
            Err(HistoryError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(h.get(0), "keep me");
    }

    #[test]
    fn load_replaces_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        std::fs::write(&path, "one\ntwo\n").unwrap();
        let mut h = HistoryStore::new(0);
        h.commit("stale");
        h.load(&path).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(0), "two");
        assert_eq!(h.get(1), "one");
    }
}
