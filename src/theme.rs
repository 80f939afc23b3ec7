//! Terminal styles for user-facing output.
//!
//! `colored` honours `NO_COLOR` and non-tty output on its own.

use colored::Colorize;

pub struct Theme;

impl Theme {
    pub fn success(text: &str) -> String {
        text.green().to_string()
    }

    pub fn muted(text: &str) -> String {
        text.dimmed().to_string()
    }

    /// Error highlight (bright red).
    pub fn error(text: &str) -> String {
        text.bright_red().to_string()
    }

    pub fn size(text: &str) -> String {
        text.magenta().to_string()
    }
}
