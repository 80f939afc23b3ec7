//! List-trash command feature.
//!
//! This module owns the "rtrash list-trash" behavior.

use crate::cli::Cli;
use crate::confirm::StdinPrompt;
use crate::operations::Commands;
use crate::output::ConsoleLog;

pub(crate) fn handle_list(cli: &Cli, depth: Option<u32>, types: &[String]) -> anyhow::Result<()> {
    let session = cli.open_session(false, types, depth, false)?;
    let opts = session.options(&[], "/")?;
    let log = ConsoleLog::new(session.mode);
    // Listing never asks anything
    let mut prompt = StdinPrompt;

    Commands::new(&session.remote, &log, &mut prompt, opts).list_trash()?;
    Ok(())
}
