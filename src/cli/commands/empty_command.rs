//! Empty-trash command feature.
//!
//! This module owns the "rtrash empty-trash" behavior.

use crate::cli::Cli;
use crate::confirm::StdinPrompt;
use crate::operations::{Commands, Outcome};
use crate::output::{ConsoleLog, Log};

pub(crate) fn handle_empty(cli: &Cli, no_prompt: bool, types: &[String]) -> anyhow::Result<()> {
    let session = cli.open_session(no_prompt, types, None, false)?;
    let opts = session.options(&[], "/")?;
    let log = ConsoleLog::new(session.mode);
    let mut prompt = StdinPrompt;

    let outcome = Commands::new(&session.remote, &log, &mut prompt, opts).empty_trash()?;
    match outcome {
        Outcome::Purged { .. } => session.save()?,
        Outcome::NothingToDo => log.logln("Trash is already empty."),
        _ => {}
    }
    Ok(())
}
