// SPDX-License-Identifier: MIT
//
// The output side of a terminal, as the renderer sees it.
//
// A backend answers "how big is the screen" and accepts raw bytes. The
// real implementation is `terminal::Terminal`; `MemoryBackend` records
// bytes in memory for tests and headless snapshots.

use std::io;

use crate::frame::Size;

/// Where rendered frames go.
pub trait Backend {
    /// Current terminal dimensions. Must reflect the latest known resize.
    fn size(&self) -> Size;

    /// Queue raw bytes for the terminal. May buffer.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Force delivery of everything written so far.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn flush(&mut self) -> io::Result<()>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn size(&self) -> Size {
        (**self).size()
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

// ─── MemoryBackend ───────────────────────────────────────────────────────────

/// An in-memory backend that records every byte written.
///
/// ```
/// use tessel_term::backend::{Backend, MemoryBackend};
/// use tessel_term::frame::Size;
///
/// let mut backend = MemoryBackend::new(Size::new(80, 24));
/// backend.write(b"\x1b[1;1H").unwrap();
/// assert_eq!(backend.take_written(), b"\x1b[1;1H");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    size: Size,
    written: Vec<u8>,
    write_calls: usize,
    flush_calls: usize,
    fail_writes: bool,
}

impl MemoryBackend {
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            written: Vec::new(),
            write_calls: 0,
            flush_calls: 0,
            fail_writes: false,
        }
    }

    /// Simulate a terminal resize.
    pub const fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Make subsequent writes fail with `BrokenPipe` (or succeed again).
    pub const fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Every byte written so far.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Take the recorded bytes, leaving the record empty.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    /// Number of successful `write` calls.
    #[must_use]
    pub const fn write_calls(&self) -> usize {
        self.write_calls
    }

    /// Number of `flush` calls.
    #[must_use]
    pub const fn flush_calls(&self) -> usize {
        self.flush_calls
    }
}

impl Backend for MemoryBackend {
    fn size(&self) -> Size {
        self.size
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "memory backend write failure",
            ));
        }
        self.written.extend_from_slice(bytes);
        self.write_calls += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_calls += 1;
        Ok(())
    }
}
