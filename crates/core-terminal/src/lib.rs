//! Terminal driver abstraction and crossterm implementation.
//!
//! The editing engine talks to the screen through the [`Terminal`] trait
//! only: one blocking event read, raw text writes, a bell, a clear, and the
//! current window width. `CrosstermBackend` implements it for a real tty;
//! [`ScriptedTerminal`] provides a deterministic stand-in for tests.
//!
//! Raw mode is entered lazily and restored by `RawModeGuard` (or the
//! backend's own `Drop`) even if the caller early-returns or panics.

use anyhow::Result;
use core_events::{KeyEvent, KeyToken, ModMask, NamedKey, TermEvent};
use crossterm::event::{
    Event as CEvent, KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};
use crossterm::terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode};
use crossterm::{cursor::MoveTo, execute};
use std::io::{Write, stdout};
use tracing::debug;

pub mod scripted;
pub use scripted::ScriptedTerminal;

/// Blocking terminal driver consumed by the editing engine.
///
/// `read_event` must not buffer: it returns exactly one event per call and
/// leaves any further pending input untouched for the next call.
pub trait Terminal {
    /// Block until the next key press or out-of-band signal.
    fn read_event(&mut self) -> Result<TermEvent>;
    /// Write raw text at the current cursor position (no interpretation
    /// beyond what the device itself performs).
    fn write(&mut self, text: &str) -> Result<()>;
    /// Ring the audible bell.
    fn beep(&mut self) -> Result<()>;
    /// Clear the whole screen and home the cursor.
    fn clear_screen(&mut self) -> Result<()>;
    /// Current window width in columns.
    fn width(&self) -> u16;
}

/// Crossterm-backed driver for a real terminal.
pub struct CrosstermBackend {
    raw: bool,
}

/// RAII guard ensuring raw mode is left even if the caller early-returns or panics.
pub struct RawModeGuard<'a> {
    backend: &'a mut CrosstermBackend,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { raw: false }
    }

    pub fn enter_raw(&mut self) -> Result<()> {
        if !self.raw {
            enable_raw_mode()?;
            self.raw = true;
            debug!(target: "io", "raw_mode_entered");
        }
        Ok(())
    }

    pub fn leave_raw(&mut self) -> Result<()> {
        if self.raw {
            disable_raw_mode()?;
            self.raw = false;
            debug!(target: "io", "raw_mode_left");
        }
        Ok(())
    }

    /// Enter raw mode and return a guard that restores cooked mode on drop.
    pub fn raw_guard(&mut self) -> Result<RawModeGuard<'_>> {
        self.enter_raw()?;
        Ok(RawModeGuard { backend: self })
    }
}

impl Terminal for CrosstermBackend {
    fn read_event(&mut self) -> Result<TermEvent> {
        // Skip events the engine has no use for (release/focus/mouse) rather
        // than surfacing them; one logical event per call.
        loop {
            match crossterm::event::read()? {
                CEvent::Key(key) if key.kind != CKeyEventKind::Release => {
                    if let Some(ev) = map_key_event(&key) {
                        return Ok(TermEvent::Key(ev));
                    }
                }
                CEvent::Resize(cols, rows) => return Ok(TermEvent::Resized(cols, rows)),
                _ => {}
            }
        }
    }

    fn write(&mut self, text: &str) -> Result<()> {
        let mut out = stdout();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn beep(&mut self) -> Result<()> {
        self.write("\u{7}")
    }

    fn clear_screen(&mut self) -> Result<()> {
        execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    fn width(&self) -> u16 {
        crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80)
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave_raw();
    }
}

impl<'a> Drop for RawModeGuard<'a> {
    fn drop(&mut self) {
        let _ = self.backend.leave_raw();
    }
}

/// Map a crossterm key event into the logical key model.
///
/// Returns `None` for key codes the engine does not handle (media keys,
/// lock keys, bare modifiers).
pub(crate) fn map_key_event(event: &CKeyEvent) -> Option<KeyEvent> {
    let token = map_key_token(&event.code)?;
    let mods = map_mod_mask(event.modifiers);
    Some(KeyEvent { token, mods })
}

pub(crate) fn map_key_token(code: &CKeyCode) -> Option<KeyToken> {
    let token = match code {
        CKeyCode::Char(c) => KeyToken::Char(*c),
        CKeyCode::Enter => KeyToken::Named(NamedKey::Enter),
        CKeyCode::Esc => KeyToken::Named(NamedKey::Esc),
        CKeyCode::Backspace => KeyToken::Named(NamedKey::Backspace),
        CKeyCode::Tab | CKeyCode::BackTab => KeyToken::Named(NamedKey::Tab),
        CKeyCode::Up => KeyToken::Named(NamedKey::Up),
        CKeyCode::Down => KeyToken::Named(NamedKey::Down),
        CKeyCode::Left => KeyToken::Named(NamedKey::Left),
        CKeyCode::Right => KeyToken::Named(NamedKey::Right),
        CKeyCode::Home => KeyToken::Named(NamedKey::Home),
        CKeyCode::End => KeyToken::Named(NamedKey::End),
        CKeyCode::Insert => KeyToken::Named(NamedKey::Insert),
        CKeyCode::Delete => KeyToken::Named(NamedKey::Delete),
        _ => return None,
    };
    Some(token)
}

pub(crate) fn map_mod_mask(mods: CKeyModifiers) -> ModMask {
    let mut out = ModMask::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= ModMask::CTRL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= ModMask::ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= ModMask::SHIFT;
    }
    out
}
