// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw terminal bytes into low-level tokens: keys, bracketed pastes
// and (reserved) in-band resizes. Handles:
//
// - Control bytes (CR → Enter, TAB, DEL/BS → Backspace)
// - Legacy CSI sequences (arrows, Home/End, the `n ~` editing and
//   function key table), with optional xterm modifier parameters
// - SS3 sequences (F1-F4 and application-mode arrows)
// - Bracketed paste (accumulated across any number of reads)
// - Alt+key (ESC followed by a character)
// - UTF-8 multi-byte characters
//
// # Design
//
// The decoder keeps a small pending buffer because escape sequences and
// multi-byte characters can be split across `read()` calls. Feed bytes
// with [`Decoder::feed`] (callback) or [`Decoder::advance`] (collects a
// `Vec`). A sequence cut off by the end of the input is held back and
// completed by the next feed. After a quiet period, [`Decoder::flush`]
// resolves whatever is still pending: a lone ESC becomes the Escape key.
//
// Malformed input is never an error. Unrecognized sequences are dropped
// and the cursor always moves forward by at least one byte.
//
// Number parsing happens directly on `&[u8]`, no intermediate `String`.

use bitflags::bitflags;
use tracing::trace;

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// Key identity as recognized by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySym {
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
    /// F1 through F12.
    Function(u8),
    /// Any other character, control characters included.
    Char(char),
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the xterm CSI modifier encoding, where the wire parameter
    /// is `1 + bitmask`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// One decoded unit of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A key with its modifiers.
    Key { code: KeySym, modifiers: Modifiers },
    /// Everything between the bracketed paste markers.
    Paste(String),
    /// Reserved for backends that report resizes in-band.
    Resize { cols: u16, rows: u16 },
}

// ─── Decoder ─────────────────────────────────────────────────────────────────

/// Bracketed paste opening marker: `ESC [ 200 ~`.
const PASTE_START: &[u8] = b"\x1b[200~";
/// Closing marker sent by xterm-compatible terminals: `ESC [ 201 ~`.
const PASTE_END: &[u8] = b"\x1b[201~";
/// Both paste markers have the same length.
const MARKER_LEN: usize = 6;

/// Incremental terminal input decoder.
///
/// Owned by exactly one reader; `feed` takes `&mut self`, so the borrow
/// checker enforces single-writer access.
///
/// ```
/// use tessel_term::input::{Decoded, Decoder, KeySym, Modifiers};
///
/// let mut decoder = Decoder::new();
/// let tokens = decoder.advance(b"\x1b[A\r");
/// assert_eq!(
///     tokens,
///     vec![
///         Decoded::Key { code: KeySym::Up, modifiers: Modifiers::empty() },
///         Decoded::Key { code: KeySym::Enter, modifiers: Modifiers::empty() },
///     ]
/// );
/// ```
#[derive(Debug, Default)]
pub struct Decoder {
    /// Bytes not yet consumed: an incomplete sequence at the end of the
    /// last feed.
    buf: Vec<u8>,
    /// Paste text accumulated so far.
    paste: Vec<u8>,
    /// Whether we're between paste markers.
    in_paste: bool,
}

impl Decoder {
    /// Create a decoder with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
            paste: Vec::new(),
            in_paste: false,
        }
    }

    /// Decode `data`, calling `emit` for each completed token in input order.
    ///
    /// An incomplete sequence at the end of `data` is kept and finished by
    /// the next call.
    pub fn feed(&mut self, data: &[u8], mut emit: impl FnMut(Decoded)) {
        self.buf.extend_from_slice(data);
        let consumed = self.drain(false, &mut emit);
        self.buf.drain(..consumed);
    }

    /// Decode `data` and collect the completed tokens.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Decoded> {
        let mut tokens = Vec::new();
        self.feed(data, |t| tokens.push(t));
        tokens
    }

    /// Resolve pending bytes as if no more input will follow them.
    ///
    /// A lone ESC becomes [`KeySym::Escape`]. A truncated CSI/SS3 sequence
    /// is dropped, a truncated UTF-8 character decodes as its lead byte.
    /// Pending bytes inside a paste become paste text; the paste itself
    /// stays open.
    pub fn flush(&mut self) -> Vec<Decoded> {
        let mut tokens = Vec::new();
        let consumed = self.drain(true, &mut |t| tokens.push(t));
        self.buf.drain(..consumed);
        tokens
    }

    /// Whether bytes are held back waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Whether a bracketed paste is in progress.
    #[must_use]
    pub const fn in_paste(&self) -> bool {
        self.in_paste
    }

    /// Drop pending bytes and any paste in progress.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.paste.clear();
        self.in_paste = false;
    }

    /// Parse as much of `buf` as possible. Returns the bytes consumed.
    fn drain(&mut self, at_eof: bool, emit: &mut impl FnMut(Decoded)) -> usize {
        let mut pos = 0;

        while pos < self.buf.len() {
            // ── Paste mode: everything is text until a marker ──────
            if self.in_paste {
                let scan = scan_paste(&self.buf[pos..], at_eof);
                self.paste
                    .extend_from_slice(&self.buf[pos..pos + scan.content]);
                pos += scan.content;

                if scan.terminated {
                    let text = String::from_utf8_lossy(&self.paste).into_owned();
                    emit(Decoded::Paste(text));
                    self.paste.clear();
                    self.in_paste = false;
                    pos += MARKER_LEN;
                    continue;
                }
                // Either everything was text, or a partial marker is held.
                break;
            }

            // ── Normal parsing ─────────────────────────────────────
            match parse(&self.buf[pos..], at_eof) {
                Parsed::Token(token, n) => {
                    emit(token);
                    pos += n;
                }
                Parsed::PasteStart => {
                    self.in_paste = true;
                    pos += MARKER_LEN;
                }
                Parsed::Skip(n) => {
                    trace!(bytes = ?&self.buf[pos..pos + n], "dropped unrecognized sequence");
                    pos += n;
                }
                Parsed::Incomplete => break,
            }
        }

        pos
    }
}

// ─── Stateless Parsing Functions ─────────────────────────────────────────────
//
// Everything below is pure: read from `buf`, report what was found and how
// many bytes it spans. `at_eof` says whether more bytes may still arrive.

/// Result of trying to parse one unit from the front of the buffer.
enum Parsed {
    /// A token spanning `usize` bytes.
    Token(Decoded, usize),
    /// The bracketed paste opening marker.
    PasteStart,
    /// Unrecognized bytes to drop.
    Skip(usize),
    /// The buffer ends mid-sequence.
    Incomplete,
}

/// Result of scanning paste content.
struct PasteScan {
    /// Bytes of paste text before the stopping point.
    content: usize,
    /// Whether a closing marker follows the content.
    terminated: bool,
}

fn scan_paste(buf: &[u8], at_eof: bool) -> PasteScan {
    let mut from = 0;
    while let Some(offset) = buf[from..].iter().position(|&b| b == 0x1B) {
        let at = from + offset;
        let tail = &buf[at..];
        if tail.starts_with(PASTE_START) || tail.starts_with(PASTE_END) {
            return PasteScan {
                content: at,
                terminated: true,
            };
        }
        if !at_eof
            && tail.len() < MARKER_LEN
            && (PASTE_START.starts_with(tail) || PASTE_END.starts_with(tail))
        {
            // Might be the closing marker; wait for the rest.
            return PasteScan {
                content: at,
                terminated: false,
            };
        }
        from = at + 1;
    }
    PasteScan {
        content: buf.len(),
        terminated: false,
    }
}

fn parse(buf: &[u8], at_eof: bool) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf, at_eof),
        0x7F | 0x08 => Parsed::Token(key(KeySym::Backspace), 1),
        0x0D => Parsed::Token(key(KeySym::Enter), 1),
        0x09 => Parsed::Token(key(KeySym::Tab), 1),
        _ => match decode_utf8(buf, at_eof) {
            Some((ch, n)) => Parsed::Token(key(KeySym::Char(ch)), n),
            None => Parsed::Incomplete,
        },
    }
}

// ── Escape sequences ─────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8], at_eof: bool) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return if at_eof {
            Parsed::Token(key(KeySym::Escape), 1)
        } else {
            Parsed::Incomplete
        };
    }

    match buf[1] {
        b'[' => parse_csi(buf, at_eof),
        b'O' => parse_ss3(buf, at_eof),
        // Alt+character.
        _ => match decode_utf8(&buf[1..], at_eof) {
            Some((ch, n)) => Parsed::Token(key_with(KeySym::Char(ch), Modifiers::ALT), 1 + n),
            None => Parsed::Incomplete,
        },
    }
}

/// A sequence cut short: wait for more, or drop it if nothing more comes.
fn truncated(buf: &[u8], at_eof: bool) -> Parsed {
    if at_eof {
        Parsed::Skip(buf.len().min(3))
    } else {
        Parsed::Incomplete
    }
}

// ── CSI (Control Sequence Introducer) ────────────────────────────────────────

fn parse_csi(buf: &[u8], at_eof: bool) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    let rest = &buf[2..];

    if rest.starts_with(&PASTE_START[2..]) {
        return Parsed::PasteStart;
    }
    let Some(&first) = rest.first() else {
        return truncated(buf, at_eof);
    };

    // ESC [ A .. ESC [ F
    if let Some(code) = cursor_key(first) {
        return Parsed::Token(key(code), 3);
    }

    // Parameter bytes: digits and `;`.
    let params_len = rest
        .iter()
        .position(|&b| !(b.is_ascii_digit() || b == b';'))
        .unwrap_or(rest.len());
    if params_len == rest.len() {
        return truncated(buf, at_eof);
    }

    let params = &rest[..params_len];
    let final_byte = rest[params_len];
    let consumed = 2 + params_len + 1;

    match (final_byte, split_params(params)) {
        // ESC [ n ~ and ESC [ n ; m ~
        (b'~', Some((n, modifiers))) => tilde_key(n).map_or(Parsed::Skip(consumed), |code| {
            Parsed::Token(key_with(code, modifiers), consumed)
        }),
        // ESC [ 1 ; m X
        (b, Some((1, modifiers))) if params.contains(&b';') => match letter_key(b) {
            Some(code) => Parsed::Token(key_with(code, modifiers), consumed),
            None => Parsed::Skip(consumed),
        },
        _ => Parsed::Skip(buf.len().min(3)),
    }
}

/// Split `n` or `n;m` parameters. `None` for any other shape.
fn split_params(raw: &[u8]) -> Option<(u16, Modifiers)> {
    let mut parts = raw.split(|&b| b == b';');
    let first = parse_number(parts.next()?)?;
    let modifiers = match parts.next() {
        Some(m) => decode_modifiers(parse_number(m)?),
        None => Modifiers::empty(),
    };
    if parts.next().is_some() {
        return None;
    }
    Some((first, modifiers))
}

/// Parse a non-empty run of ASCII digits, saturating at `u16::MAX`.
fn parse_number(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() {
        return None;
    }
    Some(digits.iter().fold(0u16, |acc, &d| {
        acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
    }))
}

/// Decode the xterm modifier parameter (`1 + bitmask`).
///
/// Only the low three bits (Shift, Alt, Ctrl) are kept.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Final bytes valid directly after `ESC [`.
const fn cursor_key(b: u8) -> Option<KeySym> {
    match b {
        b'A' => Some(KeySym::Up),
        b'B' => Some(KeySym::Down),
        b'C' => Some(KeySym::Right),
        b'D' => Some(KeySym::Left),
        b'H' => Some(KeySym::Home),
        b'F' => Some(KeySym::End),
        _ => None,
    }
}

/// Final bytes valid after `ESC [ 1 ; m`.
const fn letter_key(b: u8) -> Option<KeySym> {
    match b {
        b'P' => Some(KeySym::Function(1)),
        b'Q' => Some(KeySym::Function(2)),
        b'R' => Some(KeySym::Function(3)),
        b'S' => Some(KeySym::Function(4)),
        _ => cursor_key(b),
    }
}

/// The `ESC [ n ~` table.
const fn tilde_key(n: u16) -> Option<KeySym> {
    match n {
        1 | 7 => Some(KeySym::Home),
        4 | 8 => Some(KeySym::End),
        2 => Some(KeySym::Insert),
        3 => Some(KeySym::Delete),
        5 => Some(KeySym::PageUp),
        6 => Some(KeySym::PageDown),
        15 => Some(KeySym::Function(5)),
        17 => Some(KeySym::Function(6)),
        18 => Some(KeySym::Function(7)),
        19 => Some(KeySym::Function(8)),
        20 => Some(KeySym::Function(9)),
        21 => Some(KeySym::Function(10)),
        23 => Some(KeySym::Function(11)),
        24 => Some(KeySym::Function(12)),
        _ => None,
    }
}

// ── SS3 (Single Shift 3) ─────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8], at_eof: bool) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return truncated(buf, at_eof);
    }

    match letter_key(buf[2]) {
        Some(code) => Parsed::Token(key(code), 3),
        None => Parsed::Skip(3),
    }
}

// ── UTF-8 ────────────────────────────────────────────────────────────────────

/// Decode one code point from the front of `buf`.
///
/// The lead byte's bit pattern picks the length; continuation bytes are
/// masked to their low six bits without further validation. A lead byte
/// that fits no pattern decodes as its Latin-1 code point. Returns `None`
/// when continuation bytes are missing and more input may follow; at end
/// of input the lead byte alone is decoded as Latin-1 instead.
fn decode_utf8(buf: &[u8], at_eof: bool) -> Option<(char, usize)> {
    let lead = buf[0];
    let len = utf8_len(lead);

    if buf.len() < len {
        return at_eof.then(|| (char::from(lead), 1));
    }

    let cont = |b: u8| u32::from(b & 0x3F);
    let cp = match len {
        1 => u32::from(lead),
        2 => (u32::from(lead & 0x1F) << 6) | cont(buf[1]),
        3 => (u32::from(lead & 0x0F) << 12) | (cont(buf[1]) << 6) | cont(buf[2]),
        _ => {
            (u32::from(lead & 0x07) << 18)
                | (cont(buf[1]) << 12)
                | (cont(buf[2]) << 6)
                | cont(buf[3])
        }
    };

    // Surrogates and values past U+10FFFF are not `char`s.
    Some((char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER), len))
}

/// Sequence length implied by a lead byte (1 for anything unrecognized).
const fn utf8_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// A key with no modifiers.
const fn key(code: KeySym) -> Decoded {
    key_with(code, Modifiers::empty())
}

const fn key_with(code: KeySym, modifiers: Modifiers) -> Decoded {
    Decoded::Key { code, modifiers }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: decode bytes with a fresh decoder.
    fn parse(data: &[u8]) -> Vec<Decoded> {
        Decoder::new().advance(data)
    }

    /// Helper: decode bytes, expect exactly one token.
    fn parse_one(data: &[u8]) -> Decoded {
        let tokens = parse(data);
        assert_eq!(tokens.len(), 1, "expected 1 token, got {tokens:?}");
        tokens.into_iter().next().unwrap()
    }

    fn ch(c: char) -> Decoded {
        key(KeySym::Char(c))
    }

    // ── Control bytes ───────────────────────────────────────────────────

    #[test]
    fn carriage_return_is_enter() {
        assert_eq!(parse_one(b"\r"), key(KeySym::Enter));
    }

    #[test]
    fn tab() {
        assert_eq!(parse_one(b"\t"), key(KeySym::Tab));
    }

    #[test]
    fn backspace_both_bytes() {
        assert_eq!(parse_one(b"\x7f"), key(KeySym::Backspace));
        assert_eq!(parse_one(b"\x08"), key(KeySym::Backspace));
    }

    #[test]
    fn other_control_bytes_pass_through() {
        assert_eq!(parse_one(b"\x03"), ch('\u{3}'));
        assert_eq!(parse_one(b"\n"), ch('\n'));
        assert_eq!(parse_one(b"\x00"), ch('\0'));
    }

    // ── Characters ──────────────────────────────────────────────────────

    #[test]
    fn ascii_run() {
        assert_eq!(parse(b"abc"), vec![ch('a'), ch('b'), ch('c')]);
    }

    #[test]
    fn utf8_two_byte() {
        assert_eq!(parse_one(&[0xC3, 0xA9]), ch('é'));
    }

    #[test]
    fn utf8_three_byte() {
        assert_eq!(parse_one("中".as_bytes()), ch('中'));
    }

    #[test]
    fn utf8_four_byte() {
        assert_eq!(parse_one("🔥".as_bytes()), ch('🔥'));
    }

    #[test]
    fn stray_continuation_byte_is_latin1() {
        assert_eq!(parse_one(&[0x80]), ch('\u{80}'));
        assert_eq!(parse_one(&[0xFF]), ch('ÿ'));
    }

    #[test]
    fn surrogate_becomes_replacement() {
        assert_eq!(parse_one(&[0xED, 0xA0, 0x80]), ch('\u{FFFD}'));
    }

    // ── CSI ─────────────────────────────────────────────────────────────

    #[test]
    fn arrows_home_end() {
        assert_eq!(parse_one(b"\x1b[A"), key(KeySym::Up));
        assert_eq!(parse_one(b"\x1b[B"), key(KeySym::Down));
        assert_eq!(parse_one(b"\x1b[C"), key(KeySym::Right));
        assert_eq!(parse_one(b"\x1b[D"), key(KeySym::Left));
        assert_eq!(parse_one(b"\x1b[H"), key(KeySym::Home));
        assert_eq!(parse_one(b"\x1b[F"), key(KeySym::End));
    }

    #[test]
    fn tilde_table() {
        let table: &[(&[u8], KeySym)] = &[
            (b"\x1b[1~", KeySym::Home),
            (b"\x1b[7~", KeySym::Home),
            (b"\x1b[4~", KeySym::End),
            (b"\x1b[8~", KeySym::End),
            (b"\x1b[2~", KeySym::Insert),
            (b"\x1b[3~", KeySym::Delete),
            (b"\x1b[5~", KeySym::PageUp),
            (b"\x1b[6~", KeySym::PageDown),
            (b"\x1b[15~", KeySym::Function(5)),
            (b"\x1b[17~", KeySym::Function(6)),
            (b"\x1b[18~", KeySym::Function(7)),
            (b"\x1b[19~", KeySym::Function(8)),
            (b"\x1b[20~", KeySym::Function(9)),
            (b"\x1b[21~", KeySym::Function(10)),
            (b"\x1b[23~", KeySym::Function(11)),
            (b"\x1b[24~", KeySym::Function(12)),
        ];
        for (bytes, code) in table {
            assert_eq!(parse_one(bytes), key(*code), "input {bytes:?}");
        }
    }

    #[test]
    fn unmapped_tilde_code_is_consumed_silently() {
        assert_eq!(parse(b"\x1b[999~"), vec![]);
        assert_eq!(parse(b"\x1b[999~a\x1b[B"), vec![ch('a'), key(KeySym::Down)]);
    }

    #[test]
    fn unrecognized_csi_advances_three_bytes() {
        // ESC [ Z is dropped whole; ESC [ 5 x drops ESC [ 5 and keeps x.
        assert_eq!(parse(b"\x1b[Zq"), vec![ch('q')]);
        assert_eq!(parse(b"\x1b[5x"), vec![ch('x')]);
    }

    #[test]
    fn modified_arrows() {
        assert_eq!(
            parse_one(b"\x1b[1;5C"),
            key_with(KeySym::Right, Modifiers::CTRL)
        );
        assert_eq!(
            parse_one(b"\x1b[1;2A"),
            key_with(KeySym::Up, Modifiers::SHIFT)
        );
        assert_eq!(
            parse_one(b"\x1b[1;4D"),
            key_with(KeySym::Left, Modifiers::SHIFT | Modifiers::ALT)
        );
    }

    #[test]
    fn modified_tilde_and_function_keys() {
        assert_eq!(
            parse_one(b"\x1b[3;5~"),
            key_with(KeySym::Delete, Modifiers::CTRL)
        );
        assert_eq!(
            parse_one(b"\x1b[1;2P"),
            key_with(KeySym::Function(1), Modifiers::SHIFT)
        );
    }

    #[test]
    fn malformed_parameters_are_dropped() {
        assert_eq!(parse(b"\x1b[;5Ak"), vec![ch('5'), ch('A'), ch('k')]);
        assert_eq!(
            parse(b"\x1b[1;2;3~"),
            vec![ch(';'), ch('2'), ch(';'), ch('3'), ch('~')]
        );
    }

    // ── SS3 ─────────────────────────────────────────────────────────────

    #[test]
    fn ss3_function_keys() {
        assert_eq!(parse_one(b"\x1bOP"), key(KeySym::Function(1)));
        assert_eq!(parse_one(b"\x1bOQ"), key(KeySym::Function(2)));
        assert_eq!(parse_one(b"\x1bOR"), key(KeySym::Function(3)));
        assert_eq!(parse_one(b"\x1bOS"), key(KeySym::Function(4)));
    }

    #[test]
    fn ss3_application_arrows() {
        assert_eq!(parse_one(b"\x1bOA"), key(KeySym::Up));
        assert_eq!(parse_one(b"\x1bOH"), key(KeySym::Home));
    }

    #[test]
    fn ss3_unknown_is_dropped() {
        assert_eq!(parse(b"\x1bOzq"), vec![ch('q')]);
    }

    // ── Alt ─────────────────────────────────────────────────────────────

    #[test]
    fn alt_ascii() {
        assert_eq!(
            parse_one(b"\x1bx"),
            key_with(KeySym::Char('x'), Modifiers::ALT)
        );
    }

    #[test]
    fn alt_utf8() {
        assert_eq!(
            parse_one(&[0x1B, 0xC3, 0xA9]),
            key_with(KeySym::Char('é'), Modifiers::ALT)
        );
    }

    // ── Bracketed paste ─────────────────────────────────────────────────

    #[test]
    fn paste_framed_by_start_markers() {
        assert_eq!(
            parse(b"\x1b[200~hello\x1b[200~"),
            vec![Decoded::Paste("hello".into())]
        );
    }

    #[test]
    fn paste_framed_by_xterm_end_marker() {
        assert_eq!(
            parse(b"\x1b[200~hello\x1b[201~"),
            vec![Decoded::Paste("hello".into())]
        );
    }

    #[test]
    fn paste_keeps_escape_sequences_literal() {
        assert_eq!(
            parse(b"\x1b[200~a\x1b[Ab\r\x1b[201~"),
            vec![Decoded::Paste("a\x1b[Ab\r".into())]
        );
    }

    #[test]
    fn paste_keeps_utf8() {
        let mut input = b"\x1b[200~".to_vec();
        input.extend_from_slice("héllo 中".as_bytes());
        input.extend_from_slice(b"\x1b[201~");
        assert_eq!(parse(&input), vec![Decoded::Paste("héllo 中".into())]);
    }

    #[test]
    fn empty_paste() {
        assert_eq!(
            parse(b"\x1b[200~\x1b[201~"),
            vec![Decoded::Paste(String::new())]
        );
    }

    #[test]
    fn keys_after_paste() {
        assert_eq!(
            parse(b"\x1b[200~x\x1b[201~\ry"),
            vec![Decoded::Paste("x".into()), key(KeySym::Enter), ch('y')]
        );
    }

    #[test]
    fn paste_spans_feeds() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(b"\x1b[200~hel"), vec![]);
        assert!(d.in_paste());
        assert_eq!(d.advance(b"lo wor"), vec![]);
        assert_eq!(d.advance(b"ld\x1b[201~"), vec![Decoded::Paste("hello world".into())]);
        assert!(!d.in_paste());
    }

    #[test]
    fn paste_end_marker_split_across_feeds() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(b"\x1b[200~abc\x1b[2"), vec![]);
        assert!(d.has_pending());
        assert_eq!(d.advance(b"01~"), vec![Decoded::Paste("abc".into())]);
        assert!(!d.has_pending());
    }

    #[test]
    fn paste_start_marker_split_across_feeds() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(b"\x1b[20"), vec![]);
        assert_eq!(d.advance(b"0~hi\x1b[201~"), vec![Decoded::Paste("hi".into())]);
    }

    #[test]
    fn escape_inside_paste_that_is_not_a_marker_is_text() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(b"\x1b[200~a\x1bb"), vec![]);
        assert_eq!(d.advance(b"\x1b[201~"), vec![Decoded::Paste("a\x1bb".into())]);
    }

    // ── Split input (buffer and retry) ──────────────────────────────────

    #[test]
    fn csi_split_across_feeds() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(b"\x1b["), vec![]);
        assert_eq!(d.advance(b"A"), vec![key(KeySym::Up)]);

        assert_eq!(d.advance(b"\x1b"), vec![]);
        assert_eq!(d.advance(b"[3"), vec![]);
        assert_eq!(d.advance(b"~"), vec![key(KeySym::Delete)]);
    }

    #[test]
    fn utf8_split_across_feeds() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(&[0xE4, 0xB8]), vec![]);
        assert_eq!(d.advance(&[0xAD]), vec![ch('中')]);
    }

    #[test]
    fn alt_split_across_feeds() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(&[0x1B, 0xC3]), vec![]);
        assert_eq!(
            d.advance(&[0xA9]),
            vec![key_with(KeySym::Char('é'), Modifiers::ALT)]
        );
    }

    #[test]
    fn lone_escape_waits_then_flushes_as_escape() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(b"\x1b"), vec![]);
        assert!(d.has_pending());
        assert_eq!(d.flush(), vec![key(KeySym::Escape)]);
        assert!(!d.has_pending());
    }

    #[test]
    fn flush_truncated_utf8_is_latin1() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(&[b'a', 0xC3]), vec![ch('a')]);
        assert_eq!(d.flush(), vec![ch('Ã')]);
    }

    #[test]
    fn flush_drops_truncated_csi() {
        let mut d = Decoder::new();
        assert_eq!(d.advance(b"\x1b[1"), vec![]);
        assert_eq!(d.flush(), vec![]);
        assert!(!d.has_pending());
    }

    #[test]
    fn flush_inside_paste_keeps_text() {
        let mut d = Decoder::new();
        d.advance(b"\x1b[200~ab\x1b[");
        assert_eq!(d.flush(), vec![]);
        assert!(d.in_paste());
        assert_eq!(d.advance(b"\x1b[201~"), vec![Decoded::Paste("ab\x1b[".into())]);
    }

    #[test]
    fn flush_with_nothing_pending() {
        assert_eq!(Decoder::new().flush(), vec![]);
    }

    #[test]
    fn reset_discards_paste() {
        let mut d = Decoder::new();
        d.advance(b"\x1b[200~partial");
        d.reset();
        assert!(!d.in_paste());
        assert_eq!(d.advance(b"z"), vec![ch('z')]);
    }

    // ── Ordering and forward progress ───────────────────────────────────

    #[test]
    fn feed_emits_in_input_order() {
        let mut seen = Vec::new();
        Decoder::new().feed(b"a\x1b[B\t\x1b[6~", |t| seen.push(t));
        assert_eq!(
            seen,
            vec![
                ch('a'),
                key(KeySym::Down),
                key(KeySym::Tab),
                key(KeySym::PageDown),
            ]
        );
    }

    #[test]
    fn garbage_never_stalls() {
        let mut d = Decoder::new();
        let garbage = b"\x1b[\x1b[\x1bO\x1b[99;99;99X\x1b[<>";
        d.advance(garbage);
        d.flush();
        assert!(!d.has_pending());
        assert_eq!(d.advance(b"\r"), vec![key(KeySym::Enter)]);
    }
}
