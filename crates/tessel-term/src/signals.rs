// SPDX-License-Identifier: MIT
//
// SIGWINCH / SIGINT forwarding.
//
// Signals become ordinary InputEvents on the same channel the reader
// feeds, so applications handle a resize or an interrupt exactly like a
// key. A dedicated signal-hook iterator thread does the listening; no
// hand-written `sigaction` handler, no global flags.
//
// A resize event carries the size queried *after* the signal arrived.
// Bursts of SIGWINCH while dragging a window edge produce one event each;
// the consumer just keeps the latest.

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGINT, SIGWINCH};
use signal_hook::iterator::{Handle, Signals};
use tracing::debug;

use crate::error::{Error, Result};
use crate::event::InputEvent;
use crate::frame::Size;
use crate::terminal;

/// Forwards SIGWINCH and SIGINT into an event channel until dropped.
#[derive(Debug)]
pub struct SignalForwarder {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalForwarder {
    /// Start forwarding, reading the new size from the terminal on resize.
    ///
    /// # Errors
    ///
    /// [`Error::Signal`] if the handlers can't be registered, [`Error::Io`]
    /// if the thread can't be spawned.
    pub fn spawn(tx: Sender<InputEvent>) -> Result<Self> {
        Self::spawn_with(tx, terminal::get_size)
    }

    /// Start forwarding with a custom size query.
    ///
    /// A resize for which `query_size` returns `None` is dropped.
    ///
    /// # Errors
    ///
    /// Same as [`spawn`](Self::spawn).
    pub fn spawn_with<F>(tx: Sender<InputEvent>, query_size: F) -> Result<Self>
    where
        F: Fn() -> Option<Size> + Send + 'static,
    {
        let mut signals = Signals::new([SIGWINCH, SIGINT]).map_err(Error::Signal)?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signal-forwarder".into())
            .spawn(move || {
                for signal in signals.forever() {
                    let event = match signal {
                        SIGWINCH => match query_size() {
                            Some(size) => InputEvent::Resize {
                                cols: size.cols,
                                rows: size.rows,
                            },
                            None => continue,
                        },
                        SIGINT => InputEvent::Interrupt,
                        _ => continue,
                    };
                    debug!(signal, ?event, "forwarding signal");
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

impl Drop for SignalForwarder {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn resize_signal_becomes_event() {
        let (tx, rx) = mpsc::channel();
        let forwarder = SignalForwarder::spawn_with(tx, || Some(Size::new(132, 43))).unwrap();

        signal_hook::low_level::raise(SIGWINCH).unwrap();

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event, InputEvent::Resize { cols: 132, rows: 43 });
        drop(forwarder);
    }

    #[test]
    fn drop_joins_thread() {
        let (tx, _rx) = mpsc::channel();
        let forwarder = SignalForwarder::spawn_with(tx, || None).unwrap();
        drop(forwarder); // Must not hang.
    }
}
