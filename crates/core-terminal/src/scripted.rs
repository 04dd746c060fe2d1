//! Deterministic terminal backend for tests.
//!
//! Feeds a pre-recorded sequence of [`TermEvent`]s to the engine and captures
//! everything it writes. Reading past the end of the script is an error so a
//! test that forgets its terminating Enter fails loudly instead of hanging.

use crate::Terminal;
use anyhow::{Result, bail};
use core_events::{KeyEvent, NamedKey, TermEvent};
use std::collections::VecDeque;

pub struct ScriptedTerminal {
    events: VecDeque<TermEvent>,
    output: String,
    bells: usize,
    clears: usize,
    width: u16,
}

impl ScriptedTerminal {
    pub fn new(width: u16) -> Self {
        Self {
            events: VecDeque::new(),
            output: String::new(),
            bells: 0,
            clears: 0,
            width,
        }
    }

    pub fn push_event(&mut self, event: TermEvent) {
        self.events.push_back(event);
    }

    pub fn push_key(&mut self, key: KeyEvent) {
        self.push_event(TermEvent::Key(key));
    }

    /// Queue each character of `text` as a plain key press.
    pub fn type_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.push_key(KeyEvent::plain(ch));
        }
    }

    pub fn push_ctrl(&mut self, ch: char) {
        self.push_key(KeyEvent::ctrl(ch));
    }

    pub fn push_alt(&mut self, ch: char) {
        self.push_key(KeyEvent::alt(ch));
    }

    pub fn push_named(&mut self, key: NamedKey) {
        self.push_key(KeyEvent::named(key));
    }

    /// Everything the engine has written so far, in order.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub fn bell_count(&self) -> usize {
        self.bells
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn remaining_events(&self) -> usize {
        self.events.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_event(&mut self) -> Result<TermEvent> {
        match self.events.pop_front() {
            Some(ev) => Ok(ev),
            None => bail!("scripted terminal exhausted"),
        }
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn beep(&mut self) -> Result<()> {
        self.bells += 1;
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn width(&self) -> u16 {
        self.width
    }
}
