//! The line-editing session: one object owning the terminal, the edit
//! buffer, the history store, and the key decoder.
//!
//! `read_line` runs a blocking loop: read one terminal event, decode it to
//! an [`EditCommand`], dispatch. Every piece of per-line state (buffer,
//! decoder, browse position, completion attempts) is reset at the top of
//! each call, so a cancelled or interrupted read never leaks into the next.
//!
//! Completion state machine: the first Tab on a fresh fragment captures the
//! word before the cursor and enters `Completing`; further Tabs re-query the
//! provider with an incremented attempt counter, replacing the previous
//! insertion in place. Any buffer edit, an error response, or a finished
//! line drops back out and the next Tab starts at attempt zero. Literal
//! inserts (Ctrl-V prefixed) deliberately do not disturb completion state.

use anyhow::Result;
use core_complete::{AttemptTracker, Completer, CompletionRequest};
use core_config::EditorConfig;
use core_edit::EditBuffer;
use core_events::TermEvent;
use core_history::{Browse, HistoryStore};
use core_keymap::{EditCommand, KeyDecoder};
use core_terminal::Terminal;
use tracing::{debug, trace};

/// Result of one `read_line` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A finished line (possibly empty).
    Line(String),
    /// End of input: Ctrl-D (or Ctrl-Z, where configured) on an empty line.
    Eof,
    /// Ctrl-C with interrupts enabled; the partial line is discarded.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    /// No read in progress.
    Idle,
    /// Accumulating input.
    MoreInput,
    /// Inside a run of Tab presses on one captured fragment.
    Completing,
}

/// Interactive line editor over a terminal backend.
pub struct LineEditor<T: Terminal> {
    pub(crate) term: T,
    pub(crate) config: EditorConfig,
    pub(crate) decoder: KeyDecoder,
    pub(crate) on_interrupt: Option<Box<dyn FnMut()>>,
    history: HistoryStore,
    buffer: EditBuffer,
    attempts: AttemptTracker,
    /// Fragment captured when the current completion run began.
    fragment: String,
    /// Most recently killed span, the target of Ctrl-Y.
    yank: Option<String>,
    completer: Option<Box<dyn Completer>>,
    state: EngineState,
}

impl<T: Terminal> LineEditor<T> {
    pub fn new(term: T) -> Self {
        Self::with_config(term, EditorConfig::default())
    }

    pub fn with_config(term: T, config: EditorConfig) -> Self {
        let history = HistoryStore::new(config.history_capacity);
        let buffer = EditBuffer::new(config.word_break_chars().to_vec());
        Self {
            term,
            config,
            decoder: KeyDecoder::new(),
            on_interrupt: None,
            history,
            buffer,
            attempts: AttemptTracker::default(),
            fragment: String::new(),
            yank: None,
            completer: None,
            state: EngineState::Idle,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Replace the history store (e.g. with one loaded from a file).
    pub fn set_history(&mut self, history: HistoryStore) {
        self.history = history;
    }

    /// The line currently being composed. Useful from an interrupt handler.
    pub fn line_buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn set_completer<C: Completer + 'static>(&mut self, completer: C) {
        self.completer = Some(Box::new(completer));
    }

    pub fn clear_completer(&mut self) {
        self.completer = None;
    }

    /// Observer invoked when Ctrl-C interrupts a read (interrupt mode only).
    pub fn set_interrupt_handler<F: FnMut() + 'static>(&mut self, handler: F) {
        self.on_interrupt = Some(Box::new(handler));
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.term
    }

    pub fn into_terminal(self) -> T {
        self.term
    }

    /// Read one line of input, echoing after `prompt`.
    ///
    /// Blocks until the line is accepted, EOF is signalled on an empty
    /// buffer, or an interrupt fires. History is not touched: the caller
    /// decides which returned lines to commit.
    pub fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        self.term.write(prompt)?;
        self.buffer.reset(self.config.word_break_chars().to_vec());
        self.decoder.reset();
        self.attempts.reset();
        self.history.reset_browse();
        self.state = EngineState::MoreInput;

        loop {
            match self.term.read_event()? {
                TermEvent::Key(key) => {
                    let Some(command) = self.decoder.decode(&key) else {
                        continue;
                    };
                    if let Some(outcome) = self.apply(prompt, command)? {
                        return Ok(outcome);
                    }
                }
                TermEvent::Resized(..) | TermEvent::Resumed => self.refresh_line(prompt)?,
            }
        }
    }

    /// Dispatch one decoded command; `Some` ends the read.
    fn apply(&mut self, prompt: &str, command: EditCommand) -> Result<Option<ReadOutcome>> {
        use EditCommand::*;
        match command {
            InsertChar(ch) => {
                self.buffer.insert_char(&mut self.term, ch)?;
                self.reset_complete(EngineState::MoreInput);
            }
            // Literal control insert keeps any completion run alive.
            InsertLiteral(ch) => self.buffer.insert_char(&mut self.term, ch)?,
            MoveHome => self.buffer.move_home(&mut self.term)?,
            MoveEnd => self.buffer.move_end(&mut self.term)?,
            MoveLeft => self.buffer.move_left(&mut self.term)?,
            MoveRight => self.buffer.move_right(&mut self.term)?,
            MoveWordForward => self.buffer.move_word_forward(&mut self.term)?,
            MoveWordBackward => self.buffer.move_word_backward(&mut self.term)?,
            Backspace => {
                self.buffer.backspace(&mut self.term)?;
                self.reset_complete(EngineState::MoreInput);
            }
            DeleteChar => {
                self.buffer.delete_at_cursor(&mut self.term)?;
                self.reset_complete(EngineState::MoreInput);
            }
            EraseToStart => {
                if let Some(killed) = self.buffer.erase_to_start(&mut self.term)? {
                    self.yank = Some(killed);
                }
                self.reset_complete(EngineState::MoreInput);
            }
            // The tail span replaces the yank slot even when empty.
            EraseToEnd => {
                self.yank = Some(self.buffer.erase_to_end(&mut self.term)?);
                self.reset_complete(EngineState::MoreInput);
            }
            EraseWordBack => {
                if let Some(killed) = self.buffer.erase_word_back(&mut self.term)? {
                    self.yank = Some(killed);
                }
                self.reset_complete(EngineState::MoreInput);
            }
            EraseWordForward => {
                if let Some(killed) = self.buffer.erase_word_forward(&mut self.term)? {
                    self.yank = Some(killed);
                }
                self.reset_complete(EngineState::MoreInput);
            }
            EraseToWordStart => {
                if let Some(killed) = self.buffer.erase_to_word_start(&mut self.term)? {
                    self.yank = Some(killed);
                }
                self.reset_complete(EngineState::MoreInput);
            }
            Yank => {
                if let Some(text) = self.yank.clone() {
                    self.buffer.insert_str(&mut self.term, &text)?;
                }
                self.reset_complete(EngineState::MoreInput);
            }
            HistoryUp => {
                let live = self.buffer.text();
                match self.history.browse_up(&live) {
                    Browse::Line(line) => {
                        self.buffer.set_line(&mut self.term, &line)?;
                        self.reset_complete(EngineState::MoreInput);
                    }
                    Browse::Boundary => self.term.beep()?,
                }
            }
            HistoryDown => match self.history.browse_down() {
                Browse::Line(line) => {
                    self.buffer.set_line(&mut self.term, &line)?;
                    self.reset_complete(EngineState::MoreInput);
                }
                Browse::Boundary => self.term.beep()?,
            },
            ToggleOverwrite => self.buffer.toggle_overwrite(),
            RedrawScreen => {
                self.term.clear_screen()?;
                self.term.write(prompt)?;
                self.buffer.redraw(&mut self.term)?;
            }
            Bell => self.term.beep()?,
            ClearLine => {
                self.buffer.clear_line(&mut self.term)?;
                self.buffer.clear_current_word();
                self.history.reset_browse();
                self.reset_complete(EngineState::MoreInput);
            }
            Complete => self.tab(prompt)?,
            Accept => return self.accept().map(Some),
            EofOrDelete => {
                if self.config.ctrl_d_is_eof && self.buffer.is_empty() {
                    return self.eof().map(Some);
                }
                self.buffer.delete_at_cursor(&mut self.term)?;
                self.reset_complete(EngineState::MoreInput);
            }
            EofIfEmpty => {
                if self.config.ctrl_z_is_eof && self.buffer.is_empty() {
                    return self.eof().map(Some);
                }
            }
            Interrupt => {
                if self.config.ctrl_c_interrupts {
                    self.end_line()?;
                    self.buffer.clear_current_word();
                    self.reset_complete(EngineState::Idle);
                    if let Some(handler) = self.on_interrupt.as_mut() {
                        handler();
                    }
                    debug!(target: "session", "read_interrupted");
                    return Ok(Some(ReadOutcome::Interrupted));
                }
                self.cancel_line(prompt)?;
            }
        }
        Ok(None)
    }

    fn accept(&mut self) -> Result<ReadOutcome> {
        self.end_line()?;
        self.buffer.clear_current_word();
        self.reset_complete(EngineState::Idle);
        let mut line = self.buffer.text();
        if line.is_empty() && self.config.enter_duplicates && !self.history.is_empty() {
            line = self.history.get(0).to_string();
        }
        debug!(target: "session", chars = line.chars().count(), "line_accepted");
        Ok(ReadOutcome::Line(line))
    }

    fn eof(&mut self) -> Result<ReadOutcome> {
        self.end_line()?;
        self.buffer.clear_current_word();
        self.reset_complete(EngineState::Idle);
        debug!(target: "session", "read_eof");
        Ok(ReadOutcome::Eof)
    }

    /// Move to the end of the painted line and open a fresh row.
    fn end_line(&mut self) -> Result<()> {
        self.buffer.move_end(&mut self.term)?;
        self.term.write("\r\n")
    }

    /// Ctrl-C in non-interrupt mode: abandon the line in-band and restart
    /// editing on a fresh row under the same prompt.
    fn cancel_line(&mut self, prompt: &str) -> Result<()> {
        self.end_line()?;
        self.term.write(prompt)?;
        self.buffer.reset(self.config.word_break_chars().to_vec());
        self.history.reset_browse();
        self.decoder.reset();
        self.reset_complete(EngineState::MoreInput);
        Ok(())
    }

    /// Repaint prompt and line in place after a resize or resume signal.
    fn refresh_line(&mut self, prompt: &str) -> Result<()> {
        self.term.write("\r")?;
        self.term.write(prompt)?;
        self.buffer.redraw(&mut self.term)
    }

    /// Leave the completion state machine, dropping the attempt counter if a
    /// run was in progress, and move to `state`.
    fn reset_complete(&mut self, state: EngineState) {
        if self.state == EngineState::Completing {
            self.attempts.reset();
        }
        self.state = state;
    }

    fn tab(&mut self, prompt: &str) -> Result<()> {
        // Completer is taken for the duration of the query so the provider
        // can never observe a half-updated editor through a reentrant call.
        let Some(mut completer) = self.completer.take() else {
            self.buffer.insert_char(&mut self.term, '\t')?;
            self.reset_complete(EngineState::MoreInput);
            return Ok(());
        };

        if self.state != EngineState::Completing {
            self.fragment = self.buffer.current_word().to_string();
            self.state = EngineState::Completing;
        }
        let attempt = self.attempts.next();
        trace!(target: "complete", fragment = %self.fragment, attempt, "completion_attempt");
        let response = completer.complete(&CompletionRequest {
            fragment: &self.fragment,
            attempt,
        });
        self.completer = Some(completer);

        if let Some(insertion) = response.insertion() {
            // A later attempt replaces the previous attempt's splice at its
            // recorded position. Motion keeps the run alive, so the cursor
            // may have wandered; walk it back over the tracked span first.
            if let Some((start, chars)) = self.attempts.previous_insertion() {
                let end = (start + chars).min(self.buffer.len());
                while self.buffer.cursor() < end {
                    self.buffer.move_right(&mut self.term)?;
                }
                while self.buffer.cursor() > end {
                    self.buffer.move_left(&mut self.term)?;
                }
                self.buffer.go_back(&mut self.term, chars)?;
                self.buffer.delete(&mut self.term, chars)?;
            }
            let saved_overwrite = self.buffer.overwrite();
            self.buffer.set_overwrite(false);
            let start = self.buffer.cursor();
            self.buffer.insert_str(&mut self.term, insertion)?;
            self.buffer.set_overwrite(saved_overwrite);
            self.attempts.record_insertion(start, insertion.chars().count());
        } else if !response.alternatives().is_empty() {
            let saved = self.buffer.cursor();
            self.end_line()?;
            print_alternatives(&mut self.term, response.alternatives())?;
            self.term.write(prompt)?;
            self.buffer.set_cursor(saved);
            self.buffer.redraw(&mut self.term)?;
        } else if response.is_error() {
            self.term.beep()?;
            self.reset_complete(EngineState::MoreInput);
        } else {
            // Nothing this attempt; the run stays alive.
            self.term.beep()?;
        }
        Ok(())
    }
}

/// Print completion candidates in columns sized to the longest entry, with a
/// seven-column gutter; falls back to one per row when the window is narrow.
fn print_alternatives(term: &mut dyn Terminal, list: &[String]) -> Result<()> {
    const GUTTER: usize = 7;
    let max_width = list.iter().map(|s| s.chars().count()).max().unwrap_or(0);
    let width = term.width() as usize;
    let columns = if max_width + GUTTER > width {
        1
    } else {
        width / (max_width + GUTTER)
    };

    let mut out = String::new();
    let mut column = 0;
    for entry in list {
        out.push_str(entry);
        column += 1;
        if column < columns {
            for _ in entry.chars().count()..max_width + GUTTER {
                out.push(' ');
            }
        } else {
            out.push_str("\r\n");
            column = 0;
        }
    }
    if column != 0 {
        out.push_str("\r\n");
    }
    term.write(&out)
}
