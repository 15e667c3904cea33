// SPDX-License-Identifier: MIT
//
// Frame: one full-screen snapshot of styled cells.
//
// Stored as a flat `Vec<Cell>` in row-major order: index `i` is row
// `i / cols`, column `i % cols`. The renderer walks frames by index, so
// the flat layout is the natural one; the 2-D accessors exist for the
// code that paints.
//
// A frame is only meaningful relative to the Size it was built for. The
// invariant `len == cols * rows` is established at construction and kept
// by every mutator here.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Style};
use crate::error::{Error, Result};

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl Size {
    /// Create a size from columns and rows.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Total number of cells (`cols × rows`).
    #[inline]
    #[must_use]
    pub const fn area(self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

// ─── Frame ───────────────────────────────────────────────────────────────────

/// A row-major grid of cells sized for one terminal [`Size`].
///
/// ```
/// use tessel_term::cell::{Cell, Style};
/// use tessel_term::frame::{Frame, Size};
///
/// let mut frame = Frame::new(Size::new(10, 2));
/// assert_eq!(frame.len(), 20);
///
/// frame.put_str(0, 1, "hi", Style::DEFAULT);
/// assert_eq!(frame.get(10), Some(&Cell::new('h')));
/// assert_eq!(frame.position(11), (1, 1));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    size: Size,
    cells: Vec<Cell>,
}

impl Frame {
    /// A frame of empty cells.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            cells: vec![Cell::EMPTY; size.area()],
        }
    }

    /// Wrap an existing cell vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameSize`] if `cells.len() != size.area()`.
    pub fn from_cells(size: Size, cells: Vec<Cell>) -> Result<Self> {
        if cells.len() != size.area() {
            return Err(Error::FrameSize {
                expected: size.area(),
                actual: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    /// The size this frame was built for.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the frame has no cells (zero columns or rows).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in row-major order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at a flat index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Cell at `(col, row)`, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get_at(&self, col: u16, row: u16) -> Option<&Cell> {
        self.index_of(col, row).map(|i| &self.cells[i])
    }

    /// `(row, col)` of a flat index.
    ///
    /// Meaningless for a frame with zero columns, which has no indices.
    #[inline]
    #[must_use]
    pub fn position(&self, index: usize) -> (usize, usize) {
        let cols = usize::from(self.size.cols).max(1);
        (index / cols, index % cols)
    }

    /// Write a cell at `(col, row)`. Returns `false` if out of bounds.
    #[inline]
    pub fn set(&mut self, col: u16, row: u16, cell: Cell) -> bool {
        match self.index_of(col, row) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Overwrite every cell.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.fill(Cell::EMPTY);
    }

    /// Resize to a new terminal size, clearing all content.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.cells.clear();
        self.cells.resize(size.area(), Cell::EMPTY);
    }

    /// Become a copy of `other`, reusing this frame's allocation.
    pub fn copy_from(&mut self, other: &Self) {
        self.size = other.size;
        self.cells.clone_from(&other.cells);
    }

    /// Paint text starting at `(col, row)`, clipped to the row.
    ///
    /// The cell model is one column per scalar, so zero-width characters
    /// are skipped and anything wider than one column is painted as
    /// U+FFFD. Returns the number of columns painted.
    pub fn put_str(&mut self, col: u16, row: u16, text: &str, style: Style) -> u16 {
        if row >= self.size.rows {
            return 0;
        }

        let mut x = col;
        for ch in text.chars() {
            if x >= self.size.cols {
                break;
            }
            let ch = match ch.width() {
                Some(0) | None => continue,
                Some(1) => ch,
                Some(_) => char::REPLACEMENT_CHARACTER,
            };
            self.set(x, row, Cell::styled(ch, style));
            x += 1;
        }

        x - col
    }

    #[inline]
    fn index_of(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.size.cols && row < self.size.rows)
            .then(|| usize::from(row) * usize::from(self.size.cols) + usize::from(col))
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({}x{})", self.size.cols, self.size.rows)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
