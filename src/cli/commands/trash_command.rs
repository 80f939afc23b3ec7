//! Trash and untrash command feature.
//!
//! This module owns the "rtrash trash" and "rtrash untrash" behavior, for
//! both explicit paths and match terms.

use crate::change::Direction;
use crate::cli::{ChangeArgs, Cli};
use crate::confirm::StdinPrompt;
use crate::operations::{Commands, Outcome};
use crate::output::ConsoleLog;

pub(crate) fn handle_change(
    cli: &Cli,
    args: &ChangeArgs,
    direction: Direction,
) -> anyhow::Result<()> {
    let session = cli.open_session(args.no_prompt, &[], None, args.summary)?;
    let opts = session.options(&args.sources, &args.scope)?;
    let log = ConsoleLog::new(session.mode);
    let mut prompt = StdinPrompt;

    let outcome = {
        let mut commands = Commands::new(&session.remote, &log, &mut prompt, opts);
        match (args.matches, direction) {
            (false, Direction::ToTrash) => commands.trash(),
            (false, Direction::FromTrash) => commands.untrash(),
            (true, Direction::ToTrash) => commands.trash_by_match(),
            (true, Direction::FromTrash) => commands.untrash_by_match(),
        }?
    };

    if let Outcome::Applied { batch, .. } = &outcome {
        if batch.succeeded > 0 {
            session.save()?;
        }
    }

    if !outcome.is_clean() {
        let verb = match direction {
            Direction::ToTrash => "trashed",
            Direction::FromTrash => "restored",
        };
        anyhow::bail!("some items could not be {}", verb);
    }
    Ok(())
}
