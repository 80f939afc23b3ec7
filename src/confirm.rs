//! Confirmation gate.
//!
//! Renders a proposed change list and, unless prompting is suppressed,
//! blocks on a yes/no answer before anything is mutated.

use crate::change::{Change, Operation};
use crate::errors::Result;
use crate::output::Log;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Question shown before a batch is applied.
pub const PROCEED_QUESTION: &str = "Proceed with the changes? [Y/n]: ";

const PATH_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One line per change, then the summary.
    #[default]
    Detailed,
    /// Summary line only.
    Summary,
}

/// Source of interactive answers.
pub trait Prompt {
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Reads answers from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        print!("{}", question);
        // Flush so the question is visible before blocking on input
        io::stdout().flush()?;

        // Fresh handle per read; a lock held across prompts goes stale when
        // the terminal loses focus
        let stdin = io::stdin();
        let mut handle = stdin.lock();
        read_answer(&mut handle)
    }
}

/// Read one answer line. End of input is an error, never an empty "yes".
fn read_answer(reader: &mut impl BufRead) -> io::Result<String> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before an answer was given",
        ));
    }
    Ok(input)
}

/// Replays queued answers. Asking past the end is an `UnexpectedEof` error.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left"))
    }
}

/// Empty input means yes.
pub fn parse_answer(input: &str) -> bool {
    let trimmed = input.trim().to_lowercase();
    trimmed.is_empty() || trimmed == "y" || trimmed == "yes"
}

/// Truncate a string to a maximum display width (adds ellipsis if needed).
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }

    let ellipsis = "…";
    let target = max_width.saturating_sub(UnicodeWidthStr::width(ellipsis));

    // Keep the tail; the file name is the informative part of a path
    let mut kept: Vec<char> = Vec::new();
    let mut w = 0usize;
    for ch in s.chars().rev() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw > target {
            break;
        }
        kept.push(ch);
        w += cw;
    }
    kept.reverse();
    format!("{}{}", ellipsis, kept.into_iter().collect::<String>())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSummary {
    pub to_trash: usize,
    pub to_untrash: usize,
    pub unchanged: usize,
    pub bytes: u64,
}

impl ChangeSummary {
    pub fn of(changes: &[Change]) -> Self {
        changes.iter().fold(Self::default(), |mut acc, change| {
            match change.operation() {
                Operation::Trash => acc.to_trash += 1,
                Operation::Untrash => acc.to_untrash += 1,
                Operation::None => acc.unchanged += 1,
            }
            if !change.is_noop() {
                acc.bytes += change.size();
            }
            acc
        })
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.to_trash > 0 {
            parts.push(format!("{} to trash", self.to_trash));
        }
        if self.to_untrash > 0 {
            parts.push(format!("{} to untrash", self.to_untrash));
        }
        if self.unchanged > 0 {
            parts.push(format!("{} unchanged", self.unchanged));
        }
        if parts.is_empty() {
            return "No changes".to_string();
        }
        format!(
            "{} ({})",
            parts.join(", "),
            bytesize::to_string(self.bytes, true)
        )
    }
}

pub fn render_change_list(log: &dyn Log, changes: &[Change], mode: RenderMode) {
    if mode == RenderMode::Detailed {
        for change in changes.iter().filter(|c| !c.is_noop()) {
            log.logln(&format!(
                "{:<8} {} ({})",
                change.operation().label(),
                truncate_to_width(change.path(), PATH_WIDTH),
                bytesize::to_string(change.size(), true)
            ));
        }
    }
    log.logln(&ChangeSummary::of(changes).describe());
}

/// Ask a yes/no question. Empty input counts as yes.
pub fn ask_yes_no(prompt: &mut dyn Prompt, question: &str) -> Result<bool> {
    let answer = prompt.ask(question)?;
    Ok(parse_answer(&answer))
}

/// Render `changes` and decide whether to proceed.
///
/// With `no_prompt` set the list is still rendered and the answer is yes.
pub fn confirm_changes(
    log: &dyn Log,
    prompt: &mut dyn Prompt,
    changes: &[Change],
    no_prompt: bool,
    mode: RenderMode,
) -> Result<bool> {
    render_change_list(log, changes, mode);
    if no_prompt {
        return Ok(true);
    }
    ask_yes_no(prompt, PROCEED_QUESTION)
}
