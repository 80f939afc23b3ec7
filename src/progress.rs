use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::output::OutputMode;

/// Braille spinner frames.
pub const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate progress
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars(TICK_CHARS)
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Create a bytes-based progress bar with ETA (for trash/untrash batches)
///
/// Shows: spinner, progress bar, bytes/total_bytes, throughput, ETA, and message
pub fn create_bytes_progress_bar(total_bytes: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_bytes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) ETA: {eta} {msg}",
            )
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner owned for the duration of one long-running walk.
///
/// Stopped on drop, so an early return still clears the line.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn play(msg: &str, mode: OutputMode) -> Self {
        let bar = if mode == OutputMode::Quiet {
            ProgressBar::hidden()
        } else {
            create_spinner(msg)
        };
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    pub fn is_stopped(&self) -> bool {
        self.bar.is_finished()
    }

    pub fn stop(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Bounded task accounting for a batch, measured in bytes.
pub struct TaskProgress {
    bar: ProgressBar,
    total: u64,
}

impl TaskProgress {
    pub fn start(total: u64, msg: &str, mode: OutputMode) -> Self {
        let bar = if mode == OutputMode::Quiet {
            let pb = ProgressBar::hidden();
            pb.set_length(total);
            pb
        } else {
            create_bytes_progress_bar(total, msg)
        };
        Self { bar, total }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Drop for TaskProgress {
    fn drop(&mut self) {
        self.finish();
    }
}
