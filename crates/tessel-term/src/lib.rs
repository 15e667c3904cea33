// SPDX-License-Identifier: MIT
//
// tessel-term: terminal core for tessel.
//
// Two engines sit at the center of this crate. The input decoder turns a
// raw, arbitrarily chunked byte stream from the terminal into key, paste
// and resize events. The frame renderer compares each new full-screen
// frame with the last one it drew and writes only the ANSI bytes needed
// to turn one into the other.
//
// Everything else here exists to feed those two engines: a cell/style
// model, byte-exact escape sequence writers, a raw-mode terminal handle,
// a background reader thread, a signal forwarder, and a small event loop
// that ties the reading and rendering duties together over one channel.
//
// The terminal is driven directly with ANSI escape sequences and raw
// termios. No TUI framework in between.

pub mod ansi;
pub mod backend;
pub mod cell;
pub mod color;
pub mod diff;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod output;
pub mod reader;
#[cfg(unix)]
pub mod signals;
pub mod terminal;

pub use error::{Error, Result};
