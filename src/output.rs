//! User-facing log stream.
//!
//! Everything the reconciler wants a person to read goes through [`Log`].
//! Diagnostics for developers go through `tracing` instead.

use crate::theme::Theme;
use std::sync::Mutex;

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    Quiet, // Only errors
    #[default]
    Normal, // Standard output
    Verbose, // More details
    VeryVerbose, // All details including node ids
}

impl OutputMode {
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            OutputMode::Quiet
        } else if verbose >= 2 {
            OutputMode::VeryVerbose
        } else if verbose == 1 {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }
}

pub trait Log {
    fn logln(&self, msg: &str);

    fn log_err(&self, msg: &str);

    fn log_success(&self, msg: &str) {
        self.logln(msg);
    }

    fn mode(&self) -> OutputMode {
        OutputMode::Normal
    }
}

/// Writes to stdout/stderr with terminal styling.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLog {
    mode: OutputMode,
}

impl ConsoleLog {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl Log for ConsoleLog {
    fn logln(&self, msg: &str) {
        if self.mode != OutputMode::Quiet {
            println!("{}", msg);
        }
    }

    fn log_err(&self, msg: &str) {
        eprintln!("{}", Theme::error(msg));
    }

    fn log_success(&self, msg: &str) {
        if self.mode != OutputMode::Quiet {
            println!("{}", Theme::success(msg));
        }
    }

    fn mode(&self) -> OutputMode {
        self.mode
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LineKind,
    pub text: String,
}

/// Captures lines in memory. Used by tests and embedders that render output
/// themselves.
#[derive(Debug, Default)]
pub struct BufferLog {
    lines: Mutex<Vec<LogLine>>,
    mode: OutputMode,
}

impl BufferLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            mode,
        }
    }

    fn push(&self, kind: LineKind, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LogLine {
                kind,
                text: text.to_string(),
            });
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.of_kind(LineKind::Error)
    }

    /// Info and success lines.
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.kind != LineKind::Error)
            .map(|l| l.text)
            .collect()
    }

    fn of_kind(&self, kind: LineKind) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.text)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.text.contains(needle))
    }
}

impl Log for BufferLog {
    fn logln(&self, msg: &str) {
        self.push(LineKind::Info, msg);
    }

    fn log_err(&self, msg: &str) {
        self.push(LineKind::Error, msg);
    }

    fn log_success(&self, msg: &str) {
        self.push(LineKind::Success, msg);
    }

    fn mode(&self) -> OutputMode {
        self.mode
    }
}
