// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Instead of redrawing the entire screen every frame, we compare the new
// Frame against the last one we successfully drew and emit ANSI only for
// the cells that changed. Most updates touch a handful of cells; this
// turns a full-screen repaint into a few cursor moves and characters.
//
// The pipeline per frame:
//
//   1. The caller paints a Frame sized to the terminal.
//   2. `diff()` run-length encodes the changed cell indices into maximal
//      contiguous ChangeRegions (one linear pass).
//   3. Each region is encoded into the OutputBuffer: one cursor move to its
//      start, then characters, with StyleWriter emitting SGR only on style
//      changes. Region rows are joined by explicit cursor moves, so
//      terminal auto-wrap never matters.
//   4. The buffer goes to the backend in a single write + flush.
//   5. Only then does the frame become the new baseline.
//
// A failed write leaves the physical screen in an unknown state, so the
// baseline is dropped and the next render repaints everything.

use tracing::{debug, warn};

use crate::ansi;
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::frame::{Frame, Size};
use crate::output::{OutputBuffer, StyleWriter};

// ─── ChangeRegion ────────────────────────────────────────────────────────────

/// A maximal run of changed cell indices, `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRegion {
    pub start: usize,
    /// Inclusive.
    pub end: usize,
}

impl ChangeRegion {
    #[inline]
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Compute the change regions between `previous` and `next`.
///
/// With no previous frame, the whole of `next` is one region. Otherwise a
/// cell is changed if it differs from the previous cell at the same index,
/// or if the previous frame is shorter. Regions come out in ascending order,
/// separated by at least one unchanged cell.
///
/// ```
/// use tessel_term::cell::Cell;
/// use tessel_term::diff::{diff, ChangeRegion};
/// use tessel_term::frame::{Frame, Size};
///
/// let old = Frame::new(Size::new(10, 1));
/// let mut new = old.clone();
/// new.set(2, 0, Cell::new('x'));
/// new.set(3, 0, Cell::new('y'));
///
/// assert_eq!(diff(Some(&old), &new), vec![ChangeRegion::new(2, 3)]);
/// assert_eq!(diff(None, &new), vec![ChangeRegion::new(0, 9)]);
/// ```
#[must_use]
pub fn diff(previous: Option<&Frame>, next: &Frame) -> Vec<ChangeRegion> {
    let len = next.len();
    if len == 0 {
        return Vec::new();
    }
    let Some(previous) = previous else {
        return vec![ChangeRegion::new(0, len - 1)];
    };

    let old = previous.cells();
    let mut regions = Vec::new();
    let mut open: Option<usize> = None;

    for (i, cell) in next.cells().iter().enumerate() {
        let changed = old.get(i) != Some(cell);
        match (changed, open) {
            (true, None) => open = Some(i),
            (false, Some(start)) => {
                regions.push(ChangeRegion::new(start, i - 1));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        regions.push(ChangeRegion::new(start, len - 1));
    }

    regions
}

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass, for profiling and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Change regions drawn.
    pub regions: usize,
    /// Cells drawn across all regions.
    pub cells_rendered: usize,
    /// Bytes handed to the backend.
    pub bytes_written: usize,
}

// ─── FrameRenderer ───────────────────────────────────────────────────────────

/// Differential renderer that owns its backend.
///
/// `render` takes `&mut self`, so at most one render is in flight.
///
/// ```
/// use tessel_term::backend::MemoryBackend;
/// use tessel_term::cell::Cell;
/// use tessel_term::diff::FrameRenderer;
/// use tessel_term::frame::{Frame, Size};
///
/// let size = Size::new(4, 2);
/// let mut renderer = FrameRenderer::new(MemoryBackend::new(size));
/// let mut frame = Frame::new(size);
///
/// renderer.render(&frame)?; // first call draws everything
///
/// frame.set(1, 1, Cell::new('x'));
/// let stats = renderer.render(&frame)?;
/// assert_eq!(stats.cells_rendered, 1);
/// assert!(renderer.backend().written().ends_with(b"\x1b[2;2Hx"));
/// # Ok::<(), tessel_term::Error>(())
/// ```
pub struct FrameRenderer<B: Backend> {
    backend: B,
    /// The size the baseline was drawn at.
    size: Size,
    /// The last frame successfully written, or `None` to force a repaint.
    previous: Option<Frame>,
    output: OutputBuffer,
    style: StyleWriter,
}

impl<B: Backend> FrameRenderer<B> {
    /// Create a renderer. The first render draws the whole frame.
    pub fn new(backend: B) -> Self {
        let size = backend.size();
        Self {
            backend,
            size,
            previous: None,
            output: OutputBuffer::new(),
            style: StyleWriter::new(),
        }
    }

    /// Bring the terminal in line with `frame`.
    ///
    /// Writes nothing if `frame` matches what is already on screen.
    ///
    /// # Errors
    ///
    /// - [`Error::FrameSize`] if `frame` does not have exactly one cell per
    ///   terminal position. Nothing is written.
    /// - [`Error::Io`] if the backend write or flush fails. The next render
    ///   repaints the whole screen.
    pub fn render(&mut self, frame: &Frame) -> Result<RenderStats> {
        let size = self.backend.size();
        if size != self.size {
            debug!(
                from = ?self.size,
                to = ?size,
                "terminal resized, forcing full repaint"
            );
            self.size = size;
            self.force_redraw();
        }

        if frame.len() != size.area() {
            return Err(Error::FrameSize {
                expected: size.area(),
                actual: frame.len(),
            });
        }

        let regions = diff(self.previous.as_ref(), frame);
        if regions.is_empty() {
            return Ok(RenderStats::default());
        }

        let encoded = self.encode(frame, &regions);
        let bytes_written = self.output.len();
        let result = match encoded {
            Ok(()) => self.output.flush_to(&mut self.backend),
            Err(err) => {
                self.output.clear();
                Err(err)
            }
        };

        if let Err(err) = result {
            warn!(%err, "frame write failed, dropping baseline");
            self.force_redraw();
            return Err(err.into());
        }

        self.store_frame(frame);

        let stats = RenderStats {
            regions: regions.len(),
            cells_rendered: regions.iter().map(|r| r.end - r.start + 1).sum(),
            bytes_written,
        };
        debug!(
            regions = stats.regions,
            cells = stats.cells_rendered,
            bytes = stats.bytes_written,
            "rendered frame"
        );
        Ok(stats)
    }

    /// Discard the baseline so the next render draws everything, starting
    /// from a full style reset.
    ///
    /// Useful after something else has drawn on the screen, or when the
    /// user asks for a manual refresh.
    pub fn force_redraw(&mut self) {
        self.previous = None;
        self.style.reset_state();
    }

    /// The backend frames are written to.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    ///
    /// Writing to it directly desynchronizes the baseline; call
    /// [`force_redraw`](Self::force_redraw) afterwards.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Give the backend back.
    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Encode every region into the output buffer.
    fn encode(&mut self, frame: &Frame, regions: &[ChangeRegion]) -> std::io::Result<()> {
        let cols = usize::from(self.size.cols);
        let cells = frame.cells();

        for region in regions {
            ansi::cursor_to(&mut self.output, region.start / cols, region.start % cols)?;

            for (index, cell) in cells[region.start..=region.end]
                .iter()
                .enumerate()
                .map(|(offset, cell)| (region.start + offset, cell))
            {
                self.style.apply(&mut self.output, cell.style)?;
                self.output.push_char(cell.ch);

                // End of a row with more of the region to go: move explicitly
                // instead of trusting auto-wrap.
                let next = index + 1;
                if next % cols == 0 && index < region.end {
                    ansi::cursor_to(&mut self.output, next / cols, 0)?;
                }
            }
        }

        Ok(())
    }

    /// Keep a private copy of `frame` as the baseline.
    fn store_frame(&mut self, frame: &Frame) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(frame),
            None => self.previous = Some(frame.clone()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
