//! Key-classification stage: raw key events become tagged edit commands.
//!
//! Design principles:
//! - Pure and deterministic: the only state is the literal-next (Ctrl-V)
//!   pending flag; everything else is a straight table lookup.
//! - Policy-free: the decoder never consults configuration or buffer
//!   contents. Ctrl-D decodes to [`EditCommand::EofOrDelete`] and the session
//!   decides between EOF and delete; likewise for Ctrl-Z and Ctrl-C.
//! - Representation-insensitive: a raw control character (`Char('\u{1}')`)
//!   and a Ctrl-modified letter (`Char('a')` + CTRL) decode identically, so
//!   scripted input and interactive terminals share one table.
//!
//! `decode` returns `None` while input is still accumulating (Ctrl-V pressed,
//! unbound key); the session simply reads the next event.

use core_events::{KeyEvent, KeyToken, ModMask, NamedKey};
use tracing::trace;

/// Editing commands consumed by the session dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    /// Ordinary typed character; cancels a pending completion sequence.
    InsertChar(char),
    /// Control character inserted verbatim after Ctrl-V; does not disturb
    /// completion state.
    InsertLiteral(char),
    MoveHome,
    MoveEnd,
    MoveLeft,
    MoveRight,
    MoveWordForward,
    MoveWordBackward,
    Backspace,
    DeleteChar,
    EraseToStart,
    EraseToEnd,
    EraseWordBack,
    EraseWordForward,
    EraseToWordStart,
    Yank,
    HistoryUp,
    HistoryDown,
    ToggleOverwrite,
    RedrawScreen,
    Bell,
    ClearLine,
    Complete,
    Accept,
    /// Ctrl-D: EOF on an empty buffer or delete-at-cursor, per configuration.
    EofOrDelete,
    /// Ctrl-Z: EOF on an empty buffer, per configuration.
    EofIfEmpty,
    /// Ctrl-C: interrupt or in-band cancel, per configuration.
    Interrupt,
}

/// Stateful decoder (literal-next pending flag only).
#[derive(Debug, Default)]
pub struct KeyDecoder {
    literal_pending: bool,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any pending literal-next (new read-line call).
    pub fn reset(&mut self) {
        self.literal_pending = false;
    }

    /// Classify one key event. `None` means "no command yet".
    pub fn decode(&mut self, event: &KeyEvent) -> Option<EditCommand> {
        if self.literal_pending {
            self.literal_pending = false;
            if let Some(ch) = literal_control_char(event) {
                return Some(EditCommand::InsertLiteral(ch));
            }
            // Not a control character: fall through to normal decoding.
        }

        if let Some(code) = control_code(event) {
            if code == 0x16 {
                // Ctrl-V: the next control character is data, not a command.
                self.literal_pending = true;
                trace!(target: "input", "literal_next_armed");
                return None;
            }
            return command_for_control(code);
        }

        match (event.token, event.mods.contains(ModMask::ALT)) {
            (KeyToken::Char(ch), true) => match ch {
                'f' => Some(EditCommand::MoveWordForward),
                'b' => Some(EditCommand::MoveWordBackward),
                'd' => Some(EditCommand::EraseWordForward),
                _ => None,
            },
            (KeyToken::Named(NamedKey::Backspace | NamedKey::Delete), true) => {
                Some(EditCommand::EraseToWordStart)
            }
            (KeyToken::Named(key), false) => command_for_named(key),
            (KeyToken::Char(ch), false) if ch >= ' ' => Some(EditCommand::InsertChar(ch)),
            _ => None,
        }
    }
}

/// The control code carried by this event, if any: either a raw control
/// character token or a CTRL-modified letter (Ctrl-A => 0x01).
fn control_code(event: &KeyEvent) -> Option<u8> {
    let KeyToken::Char(ch) = event.token else {
        return None;
    };
    if event.mods.contains(ModMask::ALT) {
        return None;
    }
    let code = ch as u32;
    if code < 0x20 || code == 0x7f {
        return Some(code as u8);
    }
    if event.mods.contains(ModMask::CTRL) && ch.is_ascii_alphabetic() {
        return Some(ch.to_ascii_lowercase() as u8 & 0x1f);
    }
    None
}

/// The character a pending literal-next would insert, if this event carries
/// an insertable control character.
fn literal_control_char(event: &KeyEvent) -> Option<char> {
    control_code(event).map(char::from)
}

fn command_for_control(code: u8) -> Option<EditCommand> {
    use EditCommand::*;
    let command = match code {
        0x01 => MoveHome,
        0x02 => MoveLeft,
        0x03 => Interrupt,
        0x04 => EofOrDelete,
        0x05 => MoveEnd,
        0x06 => MoveRight,
        0x07 => Bell,
        0x08 | 0x7f => Backspace,
        0x09 => Complete,
        0x0a | 0x0d => Accept,
        0x0b => EraseToEnd,
        0x0c => RedrawScreen,
        0x0e => HistoryDown,
        0x10 => HistoryUp,
        0x15 => EraseToStart,
        0x17 => EraseWordBack,
        0x19 => Yank,
        0x1a => EofIfEmpty,
        0x1b => ClearLine,
        _ => return None,
    };
    Some(command)
}

fn command_for_named(key: NamedKey) -> Option<EditCommand> {
    use EditCommand::*;
    let command = match key {
        NamedKey::Enter => Accept,
        NamedKey::Esc => ClearLine,
        NamedKey::Backspace => Backspace,
        NamedKey::Delete => DeleteChar,
        NamedKey::Tab => Complete,
        NamedKey::Up => HistoryUp,
        NamedKey::Down => HistoryDown,
        NamedKey::Left => MoveLeft,
        NamedKey::Right => MoveRight,
        NamedKey::Home => MoveHome,
        NamedKey::End => MoveEnd,
        NamedKey::Insert => ToggleOverwrite,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyEvent;

    fn decode_one(event: KeyEvent) -> Option<EditCommand> {
        KeyDecoder::new().decode(&event)
    }

    #[test]
    fn plain_chars_insert() {
        assert_eq!(
            decode_one(KeyEvent::plain('x')),
            Some(EditCommand::InsertChar('x'))
        );
        assert_eq!(
            decode_one(KeyEvent::plain(' ')),
            Some(EditCommand::InsertChar(' '))
        );
    }

    #[test]
    fn ctrl_letters_and_raw_codes_decode_identically() {
        for (ch, raw, expected) in [
            ('a', '\u{1}', EditCommand::MoveHome),
            ('e', '\u{5}', EditCommand::MoveEnd),
            ('k', '\u{b}', EditCommand::EraseToEnd),
            ('u', '\u{15}', EditCommand::EraseToStart),
            ('w', '\u{17}', EditCommand::EraseWordBack),
            ('y', '\u{19}', EditCommand::Yank),
            ('p', '\u{10}', EditCommand::HistoryUp),
            ('n', '\u{e}', EditCommand::HistoryDown),
            ('d', '\u{4}', EditCommand::EofOrDelete),
            ('c', '\u{3}', EditCommand::Interrupt),
            ('z', '\u{1a}', EditCommand::EofIfEmpty),
            ('l', '\u{c}', EditCommand::RedrawScreen),
            ('g', '\u{7}', EditCommand::Bell),
        ] {
            assert_eq!(decode_one(KeyEvent::ctrl(ch)), Some(expected), "ctrl-{ch}");
            assert_eq!(decode_one(KeyEvent::plain(raw)), Some(expected), "raw {raw:?}");
        }
    }

    #[test]
    fn enter_and_ctrl_m_accept() {
        assert_eq!(
            decode_one(KeyEvent::named(NamedKey::Enter)),
            Some(EditCommand::Accept)
        );
        assert_eq!(decode_one(KeyEvent::ctrl('m')), Some(EditCommand::Accept));
        assert_eq!(decode_one(KeyEvent::ctrl('j')), Some(EditCommand::Accept));
    }

    #[test]
    fn del_char_is_backspace_but_delete_key_deletes_forward() {
        assert_eq!(
            decode_one(KeyEvent::plain('\u{7f}')),
            Some(EditCommand::Backspace)
        );
        assert_eq!(
            decode_one(KeyEvent::named(NamedKey::Delete)),
            Some(EditCommand::DeleteChar)
        );
    }

    #[test]
    fn alt_bindings_cover_word_operations() {
        assert_eq!(
            decode_one(KeyEvent::alt('f')),
            Some(EditCommand::MoveWordForward)
        );
        assert_eq!(
            decode_one(KeyEvent::alt('b')),
            Some(EditCommand::MoveWordBackward)
        );
        assert_eq!(
            decode_one(KeyEvent::alt('d')),
            Some(EditCommand::EraseWordForward)
        );
        assert_eq!(
            decode_one(KeyEvent::alt_named(NamedKey::Backspace)),
            Some(EditCommand::EraseToWordStart)
        );
        assert_eq!(decode_one(KeyEvent::alt('q')), None);
    }

    #[test]
    fn literal_next_inserts_following_control_char() {
        let mut d = KeyDecoder::new();
        assert_eq!(d.decode(&KeyEvent::ctrl('v')), None);
        assert_eq!(
            d.decode(&KeyEvent::ctrl('k')),
            Some(EditCommand::InsertLiteral('\u{b}'))
        );
        // Flag is one-shot: the next Ctrl-K is a command again.
        assert_eq!(
            d.decode(&KeyEvent::ctrl('k')),
            Some(EditCommand::EraseToEnd)
        );
    }

    #[test]
    fn literal_next_falls_through_for_ordinary_chars() {
        let mut d = KeyDecoder::new();
        assert_eq!(d.decode(&KeyEvent::ctrl('v')), None);
        assert_eq!(
            d.decode(&KeyEvent::plain('a')),
            Some(EditCommand::InsertChar('a'))
        );
    }

    #[test]
    fn insert_key_toggles_overwrite() {
        assert_eq!(
            decode_one(KeyEvent::named(NamedKey::Insert)),
            Some(EditCommand::ToggleOverwrite)
        );
    }

    #[test]
    fn unbound_controls_are_ignored() {
        assert_eq!(decode_one(KeyEvent::ctrl('o')), None);
        assert_eq!(decode_one(KeyEvent::plain('\u{f}')), None);
    }
}
