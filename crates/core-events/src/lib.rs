//! Core event types shared by the keyline crates.
//!
//! Everything that flows from a terminal backend into the editing engine is
//! expressed here: a logical key token model (character or named key plus a
//! modifier mask) and the small set of out-of-band signals a terminal can
//! report (window resize, process resumption). Backends translate their native
//! representation into these types; the decoding stage in `core-keymap`
//! consumes them without ever seeing backend-specific structs.

use std::fmt;

bitflags::bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModMask: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
    }
}

/// Keys that do not carry a character payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
}

/// Logical key identity: a printable (or control) character, or a named key.
///
/// Control characters may arrive either as raw `Char` codes below `0x20`
/// (scripted input, pasted data) or as a `CTRL`-modified letter (interactive
/// terminals). The decoder normalizes both forms to the same command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
}

/// One key press as surfaced by a terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub token: KeyToken,
    pub mods: ModMask,
}

impl KeyEvent {
    /// A plain character press with no modifiers.
    pub fn plain(ch: char) -> Self {
        Self {
            token: KeyToken::Char(ch),
            mods: ModMask::empty(),
        }
    }

    /// A `CTRL`-modified letter (e.g. `ctrl('a')` for Ctrl-A).
    pub fn ctrl(ch: char) -> Self {
        Self {
            token: KeyToken::Char(ch),
            mods: ModMask::CTRL,
        }
    }

    /// An `ALT`-modified character.
    pub fn alt(ch: char) -> Self {
        Self {
            token: KeyToken::Char(ch),
            mods: ModMask::ALT,
        }
    }

    /// A named key press with no modifiers.
    pub fn named(key: NamedKey) -> Self {
        Self {
            token: KeyToken::Named(key),
            mods: ModMask::empty(),
        }
    }

    /// An `ALT`-modified named key (e.g. Alt-Backspace).
    pub fn alt_named(key: NamedKey) -> Self {
        Self {
            token: KeyToken::Named(key),
            mods: ModMask::ALT,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.token, self.mods)
    }
}

/// Events surfaced by the blocking terminal read.
///
/// `Resized` and `Resumed` are fire-and-forget signals; the engine treats
/// both as a forced-redraw request and never acts on the payload beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermEvent {
    Key(KeyEvent),
    Resized(u16, u16),
    Resumed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_constructor_has_no_mods() {
        let ev = KeyEvent::plain('x');
        assert_eq!(ev.token, KeyToken::Char('x'));
        assert!(ev.mods.is_empty());
    }

    #[test]
    fn ctrl_and_alt_set_expected_bits() {
        assert!(KeyEvent::ctrl('a').mods.contains(ModMask::CTRL));
        assert!(KeyEvent::alt('f').mods.contains(ModMask::ALT));
        assert!(!KeyEvent::alt('f').mods.contains(ModMask::CTRL));
    }

    #[test]
    fn key_event_display_names_token() {
        let ev = KeyEvent::ctrl('k');
        let s = format!("{}", ev);
        assert!(s.contains("Char"));
    }

    #[test]
    fn term_event_equality() {
        assert_eq!(
            TermEvent::Key(KeyEvent::named(NamedKey::Enter)),
            TermEvent::Key(KeyEvent::named(NamedKey::Enter))
        );
        assert_ne!(TermEvent::Resumed, TermEvent::Resized(80, 24));
    }
}
