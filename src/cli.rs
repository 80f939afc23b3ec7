pub mod commands;

use crate::change::Direction;
use crate::config::Config;
use crate::operations::Options;
use crate::output::OutputMode;
use crate::remote::MemoryRemote;
use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "rtrash")]
#[command(version)]
#[command(about = "Trash, restore and purge items in a remote file tree")]
#[command(
    long_about = "rtrash reconciles trash intents against a remote file tree. Every \
    command shows the proposed changes and asks before mutating anything.\n\n\
    Examples:\n  \
    rtrash trash /docs/old.txt /tmp.log       # Move paths to trash\n  \
    rtrash untrash --matches --scope /docs log  # Restore trashed items in /docs matching 'log'\n  \
    rtrash list-trash --depth 2              # Show what is in trash\n  \
    rtrash empty-trash -y                    # Purge trash without asking"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity (-v, -vv for more)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors (implies no prompts)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// JSON snapshot of the remote tree
    #[arg(long, value_name = "FILE", global = true)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ChangeArgs {
    /// Paths to act on, or match terms with --matches
    #[arg(required = true, value_name = "PATH")]
    pub sources: Vec<String>,

    /// Treat arguments as name match terms (substring or glob)
    #[arg(long)]
    pub matches: bool,

    /// Folder that match terms are looked up in
    #[arg(long, default_value = "/", value_name = "PATH")]
    pub scope: String,

    /// Apply without asking for confirmation
    #[arg(short = 'y', long)]
    pub no_prompt: bool,

    /// Only print a summary of the change list
    #[arg(long)]
    pub summary: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move items to trash
    #[command(visible_alias = "rm")]
    Trash(ChangeArgs),

    /// Restore items from trash
    #[command(visible_alias = "restore")]
    Untrash(ChangeArgs),

    /// Permanently delete everything in trash
    EmptyTrash {
        /// Purge without asking for confirmation
        #[arg(short = 'y', long)]
        no_prompt: bool,

        /// Node kinds that count as trash content (folder, file, shortcut, all)
        #[arg(long = "type", value_name = "KIND")]
        types: Vec<String>,
    },

    /// List what is in trash
    #[command(visible_alias = "ls")]
    ListTrash {
        /// Maximum depth below the root to descend
        #[arg(long, value_name = "N")]
        depth: Option<u32>,

        /// Node kinds to list (folder, file, shortcut, all)
        #[arg(long = "type", value_name = "KIND")]
        types: Vec<String>,
    },
}

/// Everything a command handler needs, resolved from flags and config.
pub(crate) struct Session {
    pub config: Config,
    pub remote: MemoryRemote,
    pub snapshot: PathBuf,
    pub mode: OutputMode,
    /// Whether stdout is a terminal someone can answer prompts from.
    pub interactive: bool,
}

impl Session {
    pub(crate) fn save(&self) -> anyhow::Result<()> {
        self.remote.save(&self.snapshot).with_context(|| {
            format!(
                "Failed to save remote snapshot to {}",
                self.snapshot.display()
            )
        })
    }

    pub(crate) fn options(&self, sources: &[String], scope: &str) -> anyhow::Result<Options> {
        Ok(Options {
            sources: sources.to_vec(),
            scope: scope.to_string(),
            no_prompt: self.config.prompt.no_prompt || !self.interactive,
            type_mask: self.config.type_mask()?,
            max_depth: self.config.traversal.max_depth,
            render: self.config.display.render,
        })
    }
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_flags(self.quiet, self.verbose)
    }

    fn load_config(&self) -> Config {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    pub(crate) fn open_session(
        &self,
        no_prompt: bool,
        types: &[String],
        depth: Option<u32>,
        summary: bool,
    ) -> anyhow::Result<Session> {
        let mut config = self.load_config();
        config.apply_cli_overrides(no_prompt, types, depth, summary, self.snapshot.clone());
        let snapshot = config.snapshot_path()?;
        let remote = load_remote(&snapshot)?;
        debug!(snapshot = %snapshot.display(), ?config, "session opened");
        Ok(Session {
            config,
            remote,
            snapshot,
            mode: self.output_mode(),
            interactive: io::stdout().is_terminal(),
        })
    }

    pub fn run(self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Trash(args) => {
                commands::trash_command::handle_change(&self, args, Direction::ToTrash)
            }
            Commands::Untrash(args) => {
                commands::trash_command::handle_change(&self, args, Direction::FromTrash)
            }
            Commands::EmptyTrash { no_prompt, types } => {
                commands::empty_command::handle_empty(&self, *no_prompt, types)
            }
            Commands::ListTrash { depth, types } => {
                commands::list_command::handle_list(&self, *depth, types)
            }
        }
    }
}

fn load_remote(path: &Path) -> anyhow::Result<MemoryRemote> {
    MemoryRemote::load(path)
        .with_context(|| format!("Failed to open remote snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_trash_with_matches() {
        let cli = Cli::parse_from([
            "rtrash", "trash", "--matches", "--scope", "/docs", "-y", "log",
        ]);
        match cli.command {
            Commands::Trash(args) => {
                assert!(args.matches);
                assert!(args.no_prompt);
                assert_eq!(args.scope, "/docs");
                assert_eq!(args.sources, vec!["log"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from([
            "rtrash",
            "-vv",
            "list-trash",
            "--depth",
            "2",
            "--type",
            "file",
        ]);
        assert_eq!(cli.output_mode(), OutputMode::VeryVerbose);
        assert!(matches!(
            cli.command,
            Commands::ListTrash { depth: Some(2), .. }
        ));
    }

    fn session(no_prompt: bool, interactive: bool) -> Session {
        let mut config = Config::default();
        config.prompt.no_prompt = no_prompt;
        Session {
            config,
            remote: MemoryRemote::new(),
            snapshot: PathBuf::from("remote.json"),
            mode: OutputMode::Normal,
            interactive,
        }
    }

    #[test]
    fn test_prompting_needs_a_terminal() {
        let sources = vec!["/a".to_string()];
        assert!(!session(false, true).options(&sources, "/").unwrap().no_prompt);
        assert!(session(false, false).options(&sources, "/").unwrap().no_prompt);
        assert!(session(true, true).options(&sources, "/").unwrap().no_prompt);
    }

    #[test]
    fn test_trash_requires_paths() {
        assert!(Cli::try_parse_from(["rtrash", "trash"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["rtrash", "-q", "-v", "empty-trash"]).is_err());
    }
}
