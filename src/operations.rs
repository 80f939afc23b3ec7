//! User-invocable trash operations.
//!
//! Each operation builds a change list with one of the strategies in
//! [`crate::change_list`], passes it through the confirmation gate and then
//! either plays it through the batch executor or, for empty-trash, issues a
//! single purge call.

use crate::change::{Change, Direction};
use crate::change_list::{by_match, reduce, scan_trash};
use crate::confirm::{ask_yes_no, confirm_changes, Prompt, RenderMode};
use crate::errors::{Result, TrashError};
use crate::executor::{play_change_list, BatchOutcome};
use crate::node::TypeMask;
use crate::output::{Log, OutputMode};
use crate::progress::Spinner;
use crate::remote::RemoteTree;
use crate::theme::Theme;
use crate::traversal::TraversalReport;
use tracing::info;

pub const EMPTY_TRASH_QUESTION: &str = "Empty trash? [Y/n]: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Paths for explicit operations, match terms for match operations.
    pub sources: Vec<String>,
    /// Folder a match query is scoped to.
    pub scope: String,
    pub no_prompt: bool,
    pub type_mask: TypeMask,
    pub max_depth: Option<u32>,
    pub render: RenderMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            scope: "/".to_string(),
            no_prompt: false,
            type_mask: TypeMask::ALL,
            max_depth: None,
            render: RenderMode::Detailed,
        }
    }
}

impl Options {
    pub fn can_prompt(&self, mode: OutputMode) -> bool {
        !self.no_prompt && mode != OutputMode::Quiet
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// A change list was played through the executor.
    Applied {
        direction: Direction,
        batch: BatchOutcome,
        /// Sources that could not be turned into a change.
        unresolved: usize,
    },
    /// The user answered no at the confirmation gate.
    Declined,
    /// Empty-trash found nothing to purge.
    NothingToDo,
    Purged { items: usize },
    Listed(TraversalReport),
}

impl Outcome {
    /// False when any item failed to resolve or apply.
    pub fn is_clean(&self) -> bool {
        match self {
            Outcome::Applied {
                batch, unresolved, ..
            } => batch.is_clean() && *unresolved == 0,
            _ => true,
        }
    }
}

pub struct Commands<'a, R: RemoteTree + ?Sized> {
    remote: &'a R,
    log: &'a dyn Log,
    prompt: &'a mut dyn Prompt,
    opts: Options,
}

impl<'a, R: RemoteTree + ?Sized> Commands<'a, R> {
    pub fn new(remote: &'a R, log: &'a dyn Log, prompt: &'a mut dyn Prompt, opts: Options) -> Self {
        Self {
            remote,
            log,
            prompt,
            opts,
        }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    fn can_prompt(&self) -> bool {
        self.opts.can_prompt(self.log.mode())
    }

    pub fn trash(&mut self) -> Result<Outcome> {
        self.reduce_and_play(Direction::ToTrash)
    }

    pub fn untrash(&mut self) -> Result<Outcome> {
        self.reduce_and_play(Direction::FromTrash)
    }

    pub fn trash_by_match(&mut self) -> Result<Outcome> {
        self.match_and_play(false)
    }

    pub fn untrash_by_match(&mut self) -> Result<Outcome> {
        self.match_and_play(true)
    }

    fn reduce_and_play(&mut self, direction: Direction) -> Result<Outcome> {
        let changes = reduce(self.remote, self.log, &self.opts.sources, direction);
        let unresolved = self.opts.sources.len() - changes.len();
        self.gate_and_play(changes, direction, unresolved)
    }

    fn match_and_play(&mut self, in_trash: bool) -> Result<Outcome> {
        let changes = by_match(self.remote, &self.opts.scope, &self.opts.sources, in_trash)?;
        self.gate_and_play(changes, Direction::from_to_trash(!in_trash), 0)
    }

    fn gate_and_play(
        &mut self,
        changes: Vec<Change>,
        direction: Direction,
        unresolved: usize,
    ) -> Result<Outcome> {
        let no_prompt = !self.can_prompt();
        if !confirm_changes(self.log, self.prompt, &changes, no_prompt, self.opts.render)? {
            self.log.logln("Aborted");
            return Ok(Outcome::Declined);
        }

        let batch = play_change_list(self.remote, self.log, &changes, direction);
        if !changes.is_empty() {
            self.log.log_success(&batch.summary(direction));
        }
        Ok(Outcome::Applied {
            direction,
            batch,
            unresolved,
        })
    }

    pub fn empty_trash(&mut self) -> Result<Outcome> {
        let report = {
            let spinner = Spinner::play("Scanning trash...", self.log.mode());
            scan_trash(self.remote, self.opts.type_mask, None, &spinner)?
        };

        if !report.found_any() {
            info!("trash is empty, nothing to purge");
            return Ok(Outcome::NothingToDo);
        }

        if self.can_prompt() {
            self.log.logln(&format!(
                "Empty trash: {} items ({})",
                report.len(),
                bytesize::to_string(report.total_size(), true)
            ));
            if !ask_yes_no(self.prompt, EMPTY_TRASH_QUESTION)? {
                self.log.logln("Aborted emptying trash");
                return Ok(Outcome::Declined);
            }
        }

        self.remote
            .purge_all_trash()
            .map_err(|e| TrashError::mutation("purge", "trash", e))?;
        self.log.log_success("Successfully emptied trash");
        Ok(Outcome::Purged {
            items: report.len(),
        })
    }

    /// Print everything in trash, down to `max_depth` levels.
    pub fn list_trash(&mut self) -> Result<Outcome> {
        let report = {
            let spinner = Spinner::play("Scanning trash...", self.log.mode());
            scan_trash(self.remote, self.opts.type_mask, self.opts.max_depth, &spinner)?
        };

        let very_verbose = self.log.mode() == OutputMode::VeryVerbose;
        for visit in &report.items {
            let mut line = format!(
                "{:<8} {} ({})",
                visit.node.kind.as_str(),
                visit.path,
                Theme::size(&bytesize::to_string(visit.node.size, true))
            );
            if very_verbose {
                line.push_str(&format!(" {}", Theme::muted(&visit.node.id.0)));
            }
            self.log.logln(&line);
        }
        self.log.logln(&format!(
            "{} items in trash ({})",
            report.len(),
            bytesize::to_string(report.total_size(), true)
        ));
        Ok(Outcome::Listed(report))
    }
}
