// SPDX-License-Identifier: MIT
//
// Event loop: the reading and rendering duties wired together.
//
// Input arrives as finished InputEvents on one mpsc channel, fed by two
// producers: the InputReader thread (decoded terminal bytes) and the
// SignalForwarder thread (SIGWINCH, SIGINT). The loop hands each event to
// the application, and whenever something changed it asks the application
// to paint a Frame and renders it through the FrameRenderer. Only the loop
// thread ever touches the renderer.
//
// # Hybrid tick model
//
// The loop blocks on the channel with a `tick_interval` timeout:
//
//   1. Instant response: events wake the loop immediately.
//   2. Zero CPU idle: with nothing happening, `recv_timeout` just blocks.
//   3. Ticks: the timeout gives time-based state a steady heartbeat, but a
//      frame is only painted when something is dirty.
//
// # Resize
//
// The backend's size is the single source of truth. It's checked every
// iteration, so a resize is picked up even before its Resize event is
// received; the event itself just marks the frame dirty. A resize that
// lands between that check and the render makes the render reject the
// frame; the loop then re-sizes and paints again.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use tracing::debug;

use crate::backend::Backend;
use crate::diff::FrameRenderer;
use crate::error::{Error, Result};
use crate::event::InputEvent;
use crate::frame::{Frame, Size};
use crate::reader::{InputReader, ReaderConfig};
#[cfg(unix)]
use crate::signals::SignalForwarder;
use crate::terminal::{Terminal, TerminalConfig};

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Each iteration the loop calls, in order:
///
/// 1. [`on_resize`](App::on_resize) if the terminal size changed
/// 2. [`paint`](App::paint) if the frame is dirty
/// 3. [`on_event`](App::on_event) for each received event
/// 4. [`on_tick`](App::on_tick)
///
/// Only [`paint`](App::paint) is required.
pub trait App {
    /// Handle one input event. Return [`Action::Quit`] to exit the loop.
    fn on_event(&mut self, _event: &InputEvent) -> Action {
        Action::Continue
    }

    /// The terminal changed size. The frame has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Called every iteration. Return `true` if a repaint is needed.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Paint the current state. The frame was cleared before this call.
    fn paint(&mut self, frame: &mut Frame);
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Event loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Channel wait per iteration. Default: 8333μs (120 Hz).
    pub tick_interval: Duration,
    pub reader: ReaderConfig,
    pub terminal: TerminalConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_micros(8333),
            reader: ReaderConfig::default(),
            terminal: TerminalConfig::default(),
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// # Example
///
/// ```no_run
/// use tessel_term::cell::Style;
/// use tessel_term::event::{InputEvent, KeyCode};
/// use tessel_term::event_loop::{Action, App, EventLoop, LoopConfig};
/// use tessel_term::frame::Frame;
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_event(&mut self, event: &InputEvent) -> Action {
///         match event {
///             InputEvent::Key(k) if k.key == KeyCode::Escape => Action::Quit,
///             _ => Action::Continue,
///         }
///     }
///
///     fn paint(&mut self, frame: &mut Frame) {
///         frame.put_str(0, 0, "hello, press Esc", Style::DEFAULT);
///     }
/// }
///
/// EventLoop::new(LoopConfig::default()).run(&mut Hello)?;
/// # Ok::<(), tessel_term::Error>(())
/// ```
pub struct EventLoop<B: Backend> {
    renderer: FrameRenderer<B>,
    frame: Frame,
    config: LoopConfig,
}

impl EventLoop<Terminal> {
    /// An event loop on the real terminal.
    #[must_use]
    pub fn new(config: LoopConfig) -> Self {
        Self::with_backend(Terminal::new(config.terminal), config)
    }

    /// Run until the application returns [`Action::Quit`] or input ends.
    ///
    /// Enters TUI mode, starts the reader and signal threads, drives the
    /// loop, then stops the threads and restores the terminal, even when
    /// the loop fails.
    ///
    /// # Errors
    ///
    /// Returns an error if entering or leaving TUI mode, starting a
    /// thread, or rendering fails.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        self.renderer.backend_mut().enter()?;
        // `enter` cleared the screen.
        self.renderer.force_redraw();

        let result = self.session(app);
        let left = self.renderer.backend_mut().leave();
        result.and(left)
    }

    fn session(&mut self, app: &mut impl App) -> Result<()> {
        let (tx, rx) = mpsc::channel();

        #[cfg(unix)]
        let _signals = SignalForwarder::spawn(tx.clone())?;
        let mut reader = InputReader::spawn(tx, self.config.reader)?;

        let result = self.drive_until(app, &rx, &|| !reader.is_finished());
        reader.stop();
        result
    }
}

impl<B: Backend> EventLoop<B> {
    /// An event loop on any backend.
    pub fn with_backend(backend: B, config: LoopConfig) -> Self {
        let frame = Frame::new(backend.size());
        Self {
            renderer: FrameRenderer::new(backend),
            frame,
            config,
        }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        self.renderer.backend()
    }

    pub const fn backend_mut(&mut self) -> &mut B {
        self.renderer.backend_mut()
    }

    /// Process events from `rx` until the application quits or every
    /// sender is gone.
    ///
    /// # Errors
    ///
    /// Returns the first render error.
    pub fn drive(&mut self, app: &mut impl App, rx: &Receiver<InputEvent>) -> Result<()> {
        self.drive_until(app, rx, &|| true)
    }

    /// Like [`drive`](Self::drive), also stopping when `alive` turns false
    /// during a quiet tick.
    fn drive_until(
        &mut self,
        app: &mut impl App,
        rx: &Receiver<InputEvent>,
        alive: &dyn Fn() -> bool,
    ) -> Result<()> {
        let mut dirty = true;

        loop {
            // ── Keep the frame sized to the terminal ─────────────
            let size = self.renderer.backend().size();
            if size != self.frame.size() {
                debug!(?size, "frame resized");
                self.frame.resize(size);
                app.on_resize(size);
                dirty = true;
            }

            // ── Render if dirty ──────────────────────────────────
            if dirty {
                self.frame.clear();
                app.paint(&mut self.frame);
                match self.renderer.render(&self.frame) {
                    Ok(_) => dirty = false,
                    // Resized between our size check and the render: go
                    // around again at the new size.
                    Err(Error::FrameSize { expected, actual }) => {
                        debug!(expected, actual, "resized mid-render, repainting");
                        continue;
                    }
                    Err(err) => return Err(err),
                }
            }

            // ── Receive events ───────────────────────────────────
            match rx.recv_timeout(self.config.tick_interval) {
                Ok(first) => {
                    // Drain everything already queued before repainting.
                    for event in std::iter::once(first).chain(rx.try_iter()) {
                        if app.on_event(&event) == Action::Quit {
                            return Ok(());
                        }
                    }
                    dirty = true;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !alive() {
                        debug!("input ended");
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }

            // ── Tick ─────────────────────────────────────────────
            if app.on_tick() {
                dirty = true;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
