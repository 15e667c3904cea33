// SPDX-License-Identifier: MIT
//
// Public input events.
//
// The decoder speaks in `Decoded` tokens; applications speak in
// `InputEvent`s. The mapping between the two is a pure `From` impl with no
// state and no failure path. Signal-sourced events (resize, interrupt) use
// the same vocabulary, so an application never cares where an event came
// from.

pub use crate::input::Modifiers;
use crate::input::{Decoded, KeySym};

// ─── KeyCode ─────────────────────────────────────────────────────────────────

/// Key identity as seen by applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Enter,
    Backspace,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// Function key F1..F12.
    F(u8),
    /// A character key. The character itself is in [`KeyEvent::ch`].
    Char,
}

// ─── KeyEvent ────────────────────────────────────────────────────────────────

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,
    /// The literal character for [`KeyCode::Char`], `None` otherwise.
    pub ch: Option<char>,
}

impl KeyEvent {
    /// A named key with the given modifiers.
    #[inline]
    #[must_use]
    pub const fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            ch: None,
        }
    }

    /// A character key with the given modifiers.
    #[inline]
    #[must_use]
    pub const fn char(ch: char, modifiers: Modifiers) -> Self {
        Self {
            key: KeyCode::Char,
            modifiers,
            ch: Some(ch),
        }
    }

    #[inline]
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[inline]
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    #[inline]
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

// ─── InputEvent ──────────────────────────────────────────────────────────────

/// Everything an application can receive from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Bracketed paste content.
    Paste(String),
    /// The terminal changed size.
    Resize { cols: u16, rows: u16 },
    /// SIGINT was delivered to the process.
    Interrupt,
}

impl From<KeySym> for KeyEvent {
    fn from(sym: KeySym) -> Self {
        let key = match sym {
            KeySym::Char(c) => return Self::char(c, Modifiers::empty()),
            KeySym::Enter => KeyCode::Enter,
            KeySym::Backspace => KeyCode::Backspace,
            KeySym::Tab => KeyCode::Tab,
            KeySym::Escape => KeyCode::Escape,
            KeySym::Left => KeyCode::Left,
            KeySym::Right => KeyCode::Right,
            KeySym::Up => KeyCode::Up,
            KeySym::Down => KeyCode::Down,
            KeySym::Home => KeyCode::Home,
            KeySym::End => KeyCode::End,
            KeySym::PageUp => KeyCode::PageUp,
            KeySym::PageDown => KeyCode::PageDown,
            KeySym::Insert => KeyCode::Insert,
            KeySym::Delete => KeyCode::Delete,
            KeySym::Function(n) => KeyCode::F(n),
        };
        Self::new(key, Modifiers::empty())
    }
}

impl From<Decoded> for InputEvent {
    fn from(token: Decoded) -> Self {
        match token {
            Decoded::Key { code, modifiers } => Self::Key(KeyEvent {
                modifiers,
                ..KeyEvent::from(code)
            }),
            Decoded::Paste(text) => Self::Paste(text),
            Decoded::Resize { cols, rows } => Self::Resize { cols, rows },
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Decoder;
    use pretty_assertions::assert_eq;

    fn map(data: &[u8]) -> Vec<InputEvent> {
        Decoder::new()
            .advance(data)
            .into_iter()
            .map(InputEvent::from)
            .collect()
    }

    #[test]
    fn named_keys_map_one_to_one() {
        let pairs = [
            (KeySym::Enter, KeyCode::Enter),
            (KeySym::Backspace, KeyCode::Backspace),
            (KeySym::Tab, KeyCode::Tab),
            (KeySym::Escape, KeyCode::Escape),
            (KeySym::Left, KeyCode::Left),
            (KeySym::Right, KeyCode::Right),
            (KeySym::Up, KeyCode::Up),
            (KeySym::Down, KeyCode::Down),
            (KeySym::Home, KeyCode::Home),
            (KeySym::End, KeyCode::End),
            (KeySym::PageUp, KeyCode::PageUp),
            (KeySym::PageDown, KeyCode::PageDown),
            (KeySym::Insert, KeyCode::Insert),
            (KeySym::Delete, KeyCode::Delete),
            (KeySym::Function(7), KeyCode::F(7)),
        ];
        for (sym, code) in pairs {
            let ev = KeyEvent::from(sym);
            assert_eq!(ev.key, code);
            assert_eq!(ev.ch, None);
            assert!(ev.modifiers.is_empty());
        }
    }

    #[test]
    fn char_keeps_literal() {
        assert_eq!(
            KeyEvent::from(KeySym::Char('é')),
            KeyEvent::char('é', Modifiers::empty())
        );
    }

    #[test]
    fn modifiers_pass_through() {
        let ev = InputEvent::from(Decoded::Key {
            code: KeySym::Char('x'),
            modifiers: Modifiers::ALT | Modifiers::CTRL,
        });
        let InputEvent::Key(key) = ev else {
            panic!("expected key, got {ev:?}");
        };
        assert!(key.alt());
        assert!(key.ctrl());
        assert!(!key.shift());
        assert_eq!(key.ch, Some('x'));
    }

    #[test]
    fn paste_and_resize_map_identically() {
        assert_eq!(
            InputEvent::from(Decoded::Paste("abc".into())),
            InputEvent::Paste("abc".into())
        );
        assert_eq!(
            InputEvent::from(Decoded::Resize { cols: 100, rows: 30 }),
            InputEvent::Resize { cols: 100, rows: 30 }
        );
    }

    #[test]
    fn decoded_bytes_to_events() {
        assert_eq!(
            map(b"q\x1b[1;2A"),
            vec![
                InputEvent::Key(KeyEvent::char('q', Modifiers::empty())),
                InputEvent::Key(KeyEvent::new(KeyCode::Up, Modifiers::SHIFT)),
            ]
        );
    }
}
