//! Interactive line editing for terminal applications.
//!
//! [`LineEditor`] wraps a terminal backend and provides emacs-style line
//! input: cursor motion, kill and yank, history browsing, tab completion,
//! and masked password entry. Applications construct one editor per input
//! stream, register an optional [`Completer`], and call
//! [`LineEditor::read_line`] in a loop.
//!
//! ```no_run
//! use keyline::{CrosstermBackend, LineEditor, ReadOutcome};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut backend = CrosstermBackend::new();
//!     backend.enter_raw()?;
//!     let mut editor = LineEditor::new(backend);
//!     loop {
//!         match editor.read_line("> ")? {
//!             ReadOutcome::Line(line) => println!("got: {line}"),
//!             ReadOutcome::Interrupted => continue,
//!             ReadOutcome::Eof => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod logging;
mod password;
mod session;

pub use session::{LineEditor, ReadOutcome};

pub use core_complete::{AttemptTracker, Completer, CompletionRequest, CompletionResponse, ProtocolError};
pub use core_config::{ConfigError, EditorConfig, load_from as load_config};
pub use core_edit::EditBuffer;
pub use core_events::{KeyEvent, KeyToken, ModMask, NamedKey, TermEvent};
pub use core_history::{Browse, HistoryError, HistoryStore};
pub use core_keymap::{EditCommand, KeyDecoder};
pub use core_terminal::{CrosstermBackend, RawModeGuard, ScriptedTerminal, Terminal};
