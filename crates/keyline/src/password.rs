//! Masked password entry.
//!
//! A reduced key loop sharing the session's decoder: printable characters
//! echo as `*`, backspace blanks one mask, Enter finishes. No history, no
//! completion, no cursor motion; everything else is ignored so the secret
//! never hits the screen or the scroll-back.

use crate::session::{LineEditor, ReadOutcome};
use anyhow::Result;
use core_events::TermEvent;
use core_keymap::EditCommand;
use core_terminal::Terminal;

impl<T: Terminal> LineEditor<T> {
    /// Read a line without echoing it, masking each character as `*`.
    ///
    /// Honors Ctrl-C in interrupt mode like `read_line`; EOF controls are
    /// ignored because an empty password is a valid answer.
    pub fn read_password(&mut self, prompt: &str) -> Result<ReadOutcome> {
        self.term.write(prompt)?;
        self.decoder.reset();
        let mut secret = String::new();

        loop {
            let TermEvent::Key(key) = self.term.read_event()? else {
                continue;
            };
            let Some(command) = self.decoder.decode(&key) else {
                continue;
            };
            match command {
                EditCommand::Accept => {
                    self.term.write("\r\n")?;
                    return Ok(ReadOutcome::Line(secret));
                }
                EditCommand::InsertChar(ch) | EditCommand::InsertLiteral(ch) => {
                    secret.push(ch);
                    self.term.write("*")?;
                }
                EditCommand::Backspace => {
                    if secret.pop().is_some() {
                        self.term.write("\u{8} \u{8}")?;
                    } else {
                        self.term.beep()?;
                    }
                }
                EditCommand::Interrupt if self.config.ctrl_c_interrupts => {
                    self.term.write("\r\n")?;
                    if let Some(handler) = self.on_interrupt.as_mut() {
                        handler();
                    }
                    return Ok(ReadOutcome::Interrupted);
                }
                _ => {}
            }
        }
    }
}
