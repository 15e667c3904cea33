// SPDX-License-Identifier: MIT
//
// The eight base ANSI hues.
//
// Every SGR color code in the classic palette is a hue index plus a fixed
// offset: 30 for foreground, 40 for background, 90 and 100 for the bright
// variants. That is the whole color system this renderer speaks. No
// 256-color palette, no TrueColor: a VT100/xterm-compatible terminal is
// all we assume.

use std::fmt;

/// Offset added to the hue index for a foreground SGR code.
const FG_BASE: u8 = 30;
/// Offset added to the hue index for a background SGR code.
const BG_BASE: u8 = 40;
/// Offset added to the hue index for a bright foreground SGR code.
const BRIGHT_FG_BASE: u8 = 90;
/// Offset added to the hue index for a bright background SGR code.
const BRIGHT_BG_BASE: u8 = 100;

/// One of the eight base terminal hues.
///
/// The discriminant is the hue index used by SGR color codes.
///
/// ```
/// use tessel_term::color::Color;
///
/// assert_eq!(Color::Red.foreground(), 31);
/// assert_eq!(Color::Red.background(), 41);
/// assert_eq!(Color::Red.bright_foreground(), 91);
/// assert_eq!(Color::Red.bright_background(), 101);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl Color {
    /// All hues in index order.
    pub const ALL: [Self; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    /// Hue index (0–7).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// SGR foreground code (30–37).
    #[inline]
    #[must_use]
    pub const fn foreground(self) -> u8 {
        FG_BASE + self.index()
    }

    /// SGR background code (40–47).
    #[inline]
    #[must_use]
    pub const fn background(self) -> u8 {
        BG_BASE + self.index()
    }

    /// SGR bright foreground code (90–97).
    #[inline]
    #[must_use]
    pub const fn bright_foreground(self) -> u8 {
        BRIGHT_FG_BASE + self.index()
    }

    /// SGR bright background code (100–107).
    #[inline]
    #[must_use]
    pub const fn bright_background(self) -> u8 {
        BRIGHT_BG_BASE + self.index()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        };
        f.write_str(name)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_sequential() {
        for (i, color) in Color::ALL.iter().enumerate() {
            assert_eq!(usize::from(color.index()), i);
        }
    }

    #[test]
    fn black_codes() {
        assert_eq!(Color::Black.foreground(), 30);
        assert_eq!(Color::Black.background(), 40);
        assert_eq!(Color::Black.bright_foreground(), 90);
        assert_eq!(Color::Black.bright_background(), 100);
    }

    #[test]
    fn white_codes() {
        assert_eq!(Color::White.foreground(), 37);
        assert_eq!(Color::White.background(), 47);
        assert_eq!(Color::White.bright_foreground(), 97);
        assert_eq!(Color::White.bright_background(), 107);
    }

    #[test]
    fn offsets_hold_for_every_hue() {
        for color in Color::ALL {
            assert_eq!(color.background() - color.foreground(), 10);
            assert_eq!(color.bright_foreground() - color.foreground(), 60);
            assert_eq!(color.bright_background() - color.foreground(), 70);
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Color::Cyan.to_string(), "cyan");
        assert_eq!(Color::Magenta.to_string(), "magenta");
    }
}
