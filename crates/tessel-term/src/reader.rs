// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background input reader: the reading duty.
//
// A dedicated thread reads raw terminal bytes, feeds them to the one
// Decoder it owns, maps each token to an InputEvent and sends it down an
// mpsc channel in the order the bytes completed. The event loop (or any
// other consumer) only ever sees finished events.
//
// Escape timeout: a lone ESC could be the Escape key or the start of a
// sequence. While the decoder holds pending bytes, the stdin loop polls
// with `escape_timeout` instead of `poll_timeout`; if nothing arrives in
// time, it flushes the decoder and the ESC becomes a key.
//
// Shutdown: the stdin loop uses `poll()` with a short timeout, checking an
// `AtomicBool` stop flag between polls. The flag is only ever checked
// between feed calls, so a decoder is never abandoned mid-feed. A paste in
// progress at stop time is discarded. EOF, read errors and a dropped
// receiver all end the thread quietly.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::event::InputEvent;
use crate::input::Decoder;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Reader thread tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Bytes per `read()`. A keypress is 1-6 bytes, a paste can be
    /// kilobytes; 4 KB handles both.
    pub buffer_size: usize,
    /// How long one `poll()` waits before re-checking the stop flag.
    /// Bounds shutdown latency.
    pub poll_timeout: Duration,
    /// Silence after which pending bytes are resolved (lone ESC → Escape).
    pub escape_timeout: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 4096,
            poll_timeout: Duration::from_millis(50),
            escape_timeout: Duration::from_millis(25),
        }
    }
}

// ─── Pump ────────────────────────────────────────────────────────────────────

/// Decoder plus the channel its events go to.
struct Pump {
    decoder: Decoder,
    tx: Sender<InputEvent>,
}

impl Pump {
    fn new(tx: Sender<InputEvent>) -> Self {
        Self {
            decoder: Decoder::new(),
            tx,
        }
    }

    /// Feed bytes. Returns `false` once the receiver is gone.
    fn feed(&mut self, bytes: &[u8]) -> bool {
        let tx = &self.tx;
        let mut connected = true;
        self.decoder.feed(bytes, |token| {
            if connected && tx.send(token.into()).is_err() {
                connected = false;
            }
        });
        connected
    }

    /// Resolve pending bytes. Returns `false` once the receiver is gone.
    fn flush(&mut self) -> bool {
        self.decoder
            .flush()
            .into_iter()
            .all(|token| self.tx.send(token.into()).is_ok())
    }
}

// ─── InputReader ─────────────────────────────────────────────────────────────

/// Handle to the background reader thread.
///
/// The thread runs until [`stop`](Self::stop) is called (or the handle is
/// dropped), the input ends, or the receiver is dropped.
///
/// # Example
///
/// ```no_run
/// use std::sync::mpsc;
/// use tessel_term::reader::{InputReader, ReaderConfig};
///
/// let (tx, rx) = mpsc::channel();
/// let _reader = InputReader::spawn(tx, ReaderConfig::default())?;
///
/// while let Ok(event) = rx.recv() {
///     println!("{event:?}");
/// }
/// # Ok::<(), tessel_term::Error>(())
/// ```
pub struct InputReader {
    /// `None` after `stop()` joins it.
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl InputReader {
    /// Read from stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot spawn the thread.
    pub fn spawn(tx: Sender<InputEvent>, config: ReaderConfig) -> Result<Self> {
        Self::start("stdin-reader", move |stop| stdin_loop(Pump::new(tx), &stop, config))
    }

    /// Read from any byte source.
    ///
    /// The source is read with plain blocking reads, so the stop flag is
    /// seen only after a read returns and the escape timeout does not
    /// apply; pending bytes are resolved at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot spawn the thread.
    pub fn spawn_from<R>(source: R, tx: Sender<InputEvent>, config: ReaderConfig) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        Self::start("input-reader", move |stop| {
            source_loop(source, Pump::new(tx), &stop, config);
        })
    }

    fn start(name: &str, body: impl FnOnce(Arc<AtomicBool>) + Send + 'static) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                body(stop_flag);
                debug!("input reader stopped");
            })?;

        Ok(Self {
            handle: Some(handle),
            stop,
        })
    }

    /// Whether the thread has exited on its own (EOF, error, no receiver).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Signal the thread to stop and wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Loops ───────────────────────────────────────────────────────────────────

/// Poll-based stdin loop.
#[cfg(unix)]
fn stdin_loop(mut pump: Pump, stop: &AtomicBool, config: ReaderConfig) {
    use std::os::unix::io::AsRawFd;

    let stdin_fd = io::stdin().as_raw_fd();
    let mut buf = vec![0u8; config.buffer_size.max(1)];

    while !stop.load(Ordering::Relaxed) {
        let timeout = if pump.decoder.has_pending() {
            config.escape_timeout.min(config.poll_timeout)
        } else {
            config.poll_timeout
        };
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: stdin_fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, timeout_ms)
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            debug!(%err, "poll on stdin failed");
            break;
        }

        if ready == 0 {
            // Quiet period: resolve anything held back.
            if pump.decoder.has_pending() && !pump.flush() {
                break;
            }
            continue;
        }

        let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };

        if n < 0 {
            let err = io::Error::last_os_error();
            if matches!(
                err.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
            ) {
                continue;
            }
            debug!(%err, "read on stdin failed");
            break;
        }
        if n == 0 {
            pump.flush();
            break;
        }

        #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
        let chunk = &buf[..n as usize];
        if !pump.feed(chunk) {
            break;
        }
    }
}

/// Non-unix fallback: stdin without poll.
#[cfg(not(unix))]
fn stdin_loop(pump: Pump, stop: &AtomicBool, config: ReaderConfig) {
    source_loop(io::stdin(), pump, stop, config);
}

/// Blocking-read loop over an arbitrary source.
fn source_loop(mut source: impl Read, mut pump: Pump, stop: &AtomicBool, config: ReaderConfig) {
    let mut buf = vec![0u8; config.buffer_size.max(1)];

    while !stop.load(Ordering::Relaxed) {
        match source.read(&mut buf) {
            Ok(0) => {
                pump.flush();
                break;
            }
            Ok(n) => {
                if !pump.feed(&buf[..n]) {
                    break;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                debug!(%err, "input source failed");
                break;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
