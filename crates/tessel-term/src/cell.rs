// SPDX-License-Identifier: MIT
//
// Cell: the atomic unit of terminal rendering.
//
// Every character position on screen is a Cell: one Unicode scalar plus
// a Style (foreground hue, background hue, one text attribute). Frames are
// flat sequences of these, and the renderer diffs them by plain structural
// equality, so everything here is a small `Copy` value type.
//
// Attributes do not compose. A style holds exactly one attribute, and the
// renderer treats a switch between two different non-Reset attributes as
// needing a full SGR reset first. See `output::StyleWriter`.

use crate::color::Color;

// ─── Attribute ───────────────────────────────────────────────────────────────

/// A single SGR text attribute, with its protocol code as discriminant.
///
/// Includes each attribute's "off" counterpart so a style can explicitly
/// cancel one attribute without a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Attribute {
    /// SGR 0: all attributes off.
    #[default]
    Reset = 0,
    /// SGR 1: increased intensity.
    Bold = 1,
    /// SGR 2: decreased intensity.
    Faint = 2,
    /// SGR 3: italic.
    Italic = 3,
    /// SGR 4: single underline.
    Underline = 4,
    /// SGR 5: slow blink.
    BlinkSlow = 5,
    /// SGR 6: rapid blink. Rarely supported.
    BlinkFast = 6,
    /// SGR 7: swap foreground and background.
    Negative = 7,
    /// SGR 8: concealed text.
    Conceal = 8,
    /// SGR 9: crossed-out text.
    Strikethrough = 9,
    /// SGR 21: double underline.
    UnderlineDouble = 21,
    /// SGR 22: neither bold nor faint.
    NormalIntensity = 22,
    /// SGR 23: italic off.
    ItalicOff = 23,
    /// SGR 24: underline off.
    UnderlineOff = 24,
    /// SGR 25: blink off.
    BlinkOff = 25,
    /// SGR 27: negative off.
    NegativeOff = 27,
    /// SGR 28: conceal off.
    ConcealOff = 28,
    /// SGR 29: strikethrough off.
    StrikethroughOff = 29,
}

impl Attribute {
    /// The SGR parameter for this attribute.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether this is the Reset attribute.
    #[inline]
    #[must_use]
    pub const fn is_reset(self) -> bool {
        matches!(self, Self::Reset)
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Presentation of one cell: foreground, background, attribute.
///
/// Two styles are equal iff all three fields match.
///
/// ```
/// use tessel_term::cell::{Attribute, Style};
/// use tessel_term::color::Color;
///
/// let warning = Style::DEFAULT
///     .with_fg(Color::Yellow)
///     .with_attribute(Attribute::Bold);
/// assert_eq!(warning.background, Color::Black);
/// assert_ne!(warning, Style::DEFAULT);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub foreground: Color,
    pub background: Color,
    pub attribute: Attribute,
}

impl Style {
    /// White on black, no attributes.
    pub const DEFAULT: Self = Self {
        foreground: Color::White,
        background: Color::Black,
        attribute: Attribute::Reset,
    };

    /// Create a style from all three fields.
    #[inline]
    #[must_use]
    pub const fn new(foreground: Color, background: Color, attribute: Attribute) -> Self {
        Self {
            foreground,
            background,
            attribute,
        }
    }

    /// Builder: replace the foreground.
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, foreground: Color) -> Self {
        self.foreground = foreground;
        self
    }

    /// Builder: replace the background.
    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Builder: replace the attribute.
    #[inline]
    #[must_use]
    pub const fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = attribute;
        self
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// One screen position: a character and its style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// A space in the default style.
    pub const EMPTY: Self = Self {
        ch: ' ',
        style: Style::DEFAULT,
    };

    /// A character in the default style.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            style: Style::DEFAULT,
        }
    }

    /// A character in the given style.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// Builder: replace the style.
    #[inline]
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
