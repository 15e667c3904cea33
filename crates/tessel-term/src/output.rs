// SPDX-License-Identifier: MIT
//
// Output buffering and style-switch minimization.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer: accumulates all ANSI bytes in memory so a whole frame is
//   handed to the backend in a single write.
//
//   StyleWriter: remembers the style the terminal is currently drawing with
//   and emits only the SGR codes needed to reach the next cell's style. Two
//   adjacent cells with the same style cost nothing but the character.

use std::io::{self, Write};

use crate::ansi;
use crate::backend::Backend;
use crate::cell::Style;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for one backend write.
///
/// Default capacity: 16 KB, enough for a full 80x24 repaint with styles.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a character as UTF-8.
    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Hand the accumulated output to `backend` in one write, flush it, and
    /// clear the buffer.
    ///
    /// The buffer is cleared even when the backend fails.
    ///
    /// # Errors
    ///
    /// Returns the backend's write or flush error.
    pub fn flush_to<B: Backend + ?Sized>(&mut self, backend: &mut B) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = backend.write(&self.buf).and_then(|()| backend.flush());
        self.buf.clear();
        result
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op. Real delivery goes through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── StyleWriter ─────────────────────────────────────────────────────────────

/// Tracks the terminal's active style and emits minimal style switches.
///
/// # Switching rule
///
/// Attributes other than Reset do not compose. Moving to a style whose
/// attribute is Reset, or from one non-Reset attribute to a different one,
/// needs a full reset: `ESC[0m`, then the target's attribute (unless it is
/// Reset), foreground and background. Every other switch emits only the
/// fields that changed.
///
/// The reset goes first because SGR 0 clears colors too; emitting it after
/// the color codes would undo them.
///
/// When the terminal's style is unknown (after [`reset_state`]), the next
/// switch is always a full reset, even to [`Style::DEFAULT`].
///
/// [`reset_state`]: Self::reset_state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleWriter {
    /// `None` means unknown: whatever an earlier frame left behind.
    current: Option<Style>,
}

impl StyleWriter {
    /// Start from the terminal's default style.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Some(Style::DEFAULT),
        }
    }

    /// The style the terminal is drawing with, or `None` if unknown.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Option<Style> {
        self.current
    }

    /// Forget tracked state. Call when the terminal's state is unknown.
    #[inline]
    pub const fn reset_state(&mut self) {
        self.current = None;
    }

    /// Emit whatever is needed to switch the terminal to `target`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `w`.
    pub fn apply(&mut self, w: &mut impl Write, target: Style) -> io::Result<()> {
        let full_reset = match self.current {
            Some(current) if current == target => return Ok(()),
            Some(current) => {
                target.attribute.is_reset()
                    || (!current.attribute.is_reset() && target.attribute != current.attribute)
            }
            None => true,
        };

        if full_reset {
            ansi::reset(w)?;
            if !target.attribute.is_reset() {
                ansi::attribute(w, target.attribute)?;
            }
            ansi::fg(w, target.foreground)?;
            ansi::bg(w, target.background)?;
        } else if let Some(current) = self.current {
            if target.foreground != current.foreground {
                ansi::fg(w, target.foreground)?;
            }
            if target.background != current.background {
                ansi::bg(w, target.background)?;
            }
            if target.attribute != current.attribute {
                ansi::attribute(w, target.attribute)?;
            }
        }

        self.current = Some(target);
        Ok(())
    }
}

impl Default for StyleWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
