// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control. Each unsafe block
// is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. It enters raw mode via termios,
// optionally switches to the alternate screen, hides the cursor and turns on
// bracketed paste, and guarantees cleanup on drop, even if the application
// panics mid-frame.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a pre-built
// restore sequence directly to fd 1. A panic while the lock is held (during
// a frame flush) would otherwise deadlock. One raw write, everything
// restored, then the original panic handler prints to a working terminal.
//
// `Terminal` is also the production `Backend`: frames rendered through it
// go straight to stdout.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use tracing::debug;

use crate::ansi;
use crate::backend::Backend;
use crate::error::Result;
use crate::frame::Size;

/// Size assumed when the OS can't tell us (not a TTY, piped output).
pub const FALLBACK_SIZE: Size = Size::new(80, 24);

// ─── Configuration ──────────────────────────────────────────────────────────

/// Which terminal modes [`Terminal::enter`] switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalConfig {
    /// Draw on the alternate screen, restoring the shell's screen on exit.
    pub alt_screen: bool,
    /// Hide the cursor while active.
    pub hide_cursor: bool,
    /// Ask the terminal to frame pastes with bracketed paste markers.
    pub bracketed_paste: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            alt_screen: true,
            hide_cursor: true,
            bracketed_paste: true,
        }
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(ws.ws_col, ws.ws_row))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Apply `termios` to stdin.
#[cfg(unix)]
fn set_termios(action: libc::c_int, termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, action, termios) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Some(original) = TERMIOS_BACKUP.lock().ok().and_then(|guard| *guard) {
        let _ = set_termios(libc::TCSANOW, &original);
    }
}

/// Complete terminal restore sequence for emergency use.
///
/// Disable bracketed paste, reset SGR, show cursor, exit alternate screen.
/// Leaving the alternate screen comes last so the shell's content reappears
/// clean. Sent regardless of which modes were enabled; turning off a mode
/// that was never on is harmless.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

/// Ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter`](Self::enter) to switch to TUI mode. The terminal is
/// restored when the handle is dropped, and by the panic hook if the
/// process panics first.
///
/// # Example
///
/// ```no_run
/// use tessel_term::terminal::{Terminal, TerminalConfig};
///
/// let mut term = Terminal::new(TerminalConfig::default());
/// term.enter()?;
/// // ... render frames, handle input ...
/// // Terminal is restored automatically on drop.
/// # Ok::<(), tessel_term::Error>(())
/// ```
pub struct Terminal {
    config: TerminalConfig,

    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Last known size. Refresh with [`refresh_size`](Self::refresh_size).
    size: Size,

    /// Whether we're in TUI mode.
    active: bool,
}

impl Terminal {
    /// Create a terminal handle and query the current size.
    ///
    /// Does **not** enter TUI mode. Falls back to 80x24 if the size cannot
    /// be determined.
    #[must_use]
    pub fn new(config: TerminalConfig) -> Self {
        Self {
            config,
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(FALLBACK_SIZE),
            active: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Re-query the terminal size from the OS and cache it.
    ///
    /// Keeps the previous size if the query fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        }
        self.size
    }

    /// Whether we're currently in TUI mode.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter TUI mode.
    ///
    /// Enables raw mode (via termios), then per [`TerminalConfig`] switches
    /// to the alternate screen and hides the cursor; always clears the
    /// screen; then enables bracketed paste if configured.
    ///
    /// Idempotent: calling `enter()` while already active is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or terminal output fails.
    pub fn enter(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if self.config.alt_screen {
            ansi::enter_alt_screen(&mut lock)?;
        }
        if self.config.hide_cursor {
            ansi::cursor_hide(&mut lock)?;
        }
        ansi::clear_screen(&mut lock)?;
        if self.config.bracketed_paste {
            ansi::enable_bracketed_paste(&mut lock)?;
        }
        lock.flush()?;

        self.active = true;
        debug!(size = ?self.size, config = ?self.config, "entered TUI mode");
        Ok(())
    }

    /// Leave TUI mode and restore the terminal.
    ///
    /// Undoes [`enter`](Self::enter) in reverse order. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or termios restore fails.
    pub fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if self.config.bracketed_paste {
            ansi::disable_bracketed_paste(&mut lock)?;
        }
        ansi::reset(&mut lock)?;
        if self.config.hide_cursor {
            ansi::cursor_show(&mut lock)?;
        }
        if self.config.alt_screen {
            ansi::exit_alt_screen(&mut lock)?;
        }
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        debug!("left TUI mode");
        Ok(())
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }

        self.original_termios = Some(termios);
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(termios);
        }

        // Clears ISIG too: Ctrl-C arrives as byte 0x03, not SIGINT.
        unsafe { libc::cfmakeraw(&raw mut termios) };
        // Blocking reads return as soon as one byte is available.
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;

        set_termios(libc::TCSAFLUSH, &termios)
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        let Some(original) = self.original_termios else {
            return Ok(());
        };
        set_termios(libc::TCSAFLUSH, &original)?;

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
        self.original_termios = None;
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Backend for Terminal {
    /// Asks the OS every time, so a resize is visible before SIGWINCH is
    /// handled. Falls back to the last cached size.
    fn size(&self) -> Size {
        get_size().unwrap_or(self.size)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
