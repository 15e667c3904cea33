// SPDX-License-Identifier: MIT
//
// Crate-wide error type.

use std::io;

/// Errors surfaced by the renderer, the terminal handle and the signal
/// forwarder.
///
/// The input decoder has no error path: malformed input is dropped, never
/// reported.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing to or configuring the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A frame's cell count does not match the terminal it targets.
    #[error("frame has {actual} cells but the terminal needs {expected}")]
    FrameSize { expected: usize, actual: usize },

    /// Installing the SIGWINCH/SIGINT handlers failed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] io::Error),
}

/// `Result` specialized to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
