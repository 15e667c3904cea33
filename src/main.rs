// SPDX-License-Identifier: MIT
//
// tessel: a live viewer for what the terminal sends.
//
// Wires the tessel-term core together end to end: the reader thread
// decodes keys and pastes, the signal thread reports resizes, and every
// change is painted into a Frame and diff-rendered to the screen.
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ title (BOLD)                 │  ← 1 row
//   ├──────────────────────────────┤
//   │ event log, newest last       │  ← h - 2 rows
//   ├──────────────────────────────┤
//   │ status line (NEGATIVE)       │  ← 1 row
//   └──────────────────────────────┘
//
// Quit with Esc, `q`, or Ctrl-C. Set TESSEL_LOG=<file> to write tracing
// output there (filter with RUST_LOG, default `debug`).

use std::collections::VecDeque;
use std::env;
use std::fs::File;
use std::process;
use std::sync::Mutex;

use tessel_term::cell::{Attribute, Style};
use tessel_term::color::Color;
use tessel_term::event::{InputEvent, KeyCode, KeyEvent};
use tessel_term::event_loop::{Action, App, EventLoop, LoopConfig};
use tessel_term::frame::{Frame, Size};
use tracing_subscriber::EnvFilter;

/// Oldest entries fall off once the log holds this many.
const LOG_CAPACITY: usize = 512;

// ─── Viewer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Viewer {
    log: VecDeque<String>,
    keys: usize,
    pastes: usize,
}

impl Viewer {
    fn record(&mut self, line: String) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}

/// Whether a key means "quit": Esc, `q`, or the raw Ctrl-C byte.
fn is_quit(key: &KeyEvent) -> bool {
    key.key == KeyCode::Escape || matches!(key.ch, Some('q' | '\u{3}'))
}

/// Human-readable key name, e.g. `Ctrl+Alt+Up` or `'é'`.
fn describe_key(key: &KeyEvent) -> String {
    let mut name = String::new();
    if key.ctrl() {
        name.push_str("Ctrl+");
    }
    if key.alt() {
        name.push_str("Alt+");
    }
    if key.shift() {
        name.push_str("Shift+");
    }
    match (key.key, key.ch) {
        (KeyCode::Char, Some(c)) if c.is_control() => {
            name.push_str(&format!("U+{:04X}", u32::from(c)));
        }
        (KeyCode::Char, Some(c)) => name.push_str(&format!("'{c}'")),
        (KeyCode::F(n), _) => name.push_str(&format!("F{n}")),
        (code, _) => name.push_str(&format!("{code:?}")),
    }
    name
}

impl App for Viewer {
    fn on_event(&mut self, event: &InputEvent) -> Action {
        match event {
            InputEvent::Key(key) => {
                if is_quit(key) {
                    return Action::Quit;
                }
                self.keys += 1;
                self.record(format!("key    {}", describe_key(key)));
            }
            InputEvent::Paste(text) => {
                self.pastes += 1;
                let preview: String = text.chars().take(40).collect();
                self.record(format!(
                    "paste  {} chars: {:?}",
                    text.chars().count(),
                    preview
                ));
            }
            InputEvent::Resize { cols, rows } => {
                self.record(format!("resize {cols}x{rows}"));
            }
            InputEvent::Interrupt => return Action::Quit,
        }
        Action::Continue
    }

    fn paint(&mut self, frame: &mut Frame) {
        let Size { cols, rows } = frame.size();
        if rows == 0 {
            return;
        }

        let title = Style::DEFAULT
            .with_fg(Color::Cyan)
            .with_attribute(Attribute::Bold);
        frame.put_str(0, 0, "tessel: press keys, paste, resize. Esc/q quits.", title);

        // Event log, newest at the bottom.
        let log_rows = usize::from(rows.saturating_sub(2));
        let skip = self.log.len().saturating_sub(log_rows);
        for (row, line) in (1..).zip(self.log.iter().skip(skip)) {
            frame.put_str(0, row, line, Style::DEFAULT);
        }

        if rows >= 2 {
            let status = Style::DEFAULT.with_attribute(Attribute::Negative);
            let text = format!(
                " {cols}x{rows}  keys {}  pastes {} ",
                self.keys, self.pastes
            );
            let painted = frame.put_str(0, rows - 1, &text, status);
            // Extend the bar across the row.
            for col in painted..cols {
                frame.put_str(col, rows - 1, " ", status);
            }
        }
    }
}

// ─── Logging ─────────────────────────────────────────────────────────────────

/// Log to the file named by `TESSEL_LOG`, if any. The terminal itself is
/// off limits: log lines would corrupt the rendered screen.
fn init_logging() {
    let Ok(path) = env::var("TESSEL_LOG") else {
        return;
    };
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("tessel: cannot open log file {path}: {e}");
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn main() {
    init_logging();

    let mut viewer = Viewer::default();
    let mut event_loop = EventLoop::new(LoopConfig::default());

    if let Err(e) = event_loop.run(&mut viewer) {
        tracing::error!(error = %e, "event loop failed");
        eprintln!("tessel: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
