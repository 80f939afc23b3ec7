//! Batch executor.
//!
//! Applies an approved change list one item at a time. A failing item is
//! logged and counted; it never stops the rest of the batch.

use crate::change::{total_size, Change, Direction};
use crate::errors::TrashError;
use crate::output::Log;
use crate::progress::TaskProgress;
use crate::remote::RemoteTree;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Bytes across both sides of every change, no-ops included.
    pub total_bytes: u64,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<String>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn summary(&self, direction: Direction) -> String {
        let verb = match direction {
            Direction::ToTrash => "Trashed",
            Direction::FromTrash => "Restored",
        };
        format!(
            "{} {} items ({}), {} errors, {} skipped",
            verb,
            self.succeeded,
            bytesize::to_string(self.total_bytes, true),
            self.failed,
            self.skipped
        )
    }
}

pub fn play_change_list<R: RemoteTree + ?Sized>(
    remote: &R,
    log: &dyn Log,
    changes: &[Change],
    direction: Direction,
) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        total_bytes: total_size(changes),
        ..BatchOutcome::default()
    };

    let message = match direction {
        Direction::ToTrash => "Trashing...",
        Direction::FromTrash => "Restoring...",
    };
    let task = TaskProgress::start(outcome.total_bytes, message, log.mode());
    debug!(
        count = changes.len(),
        total_bytes = outcome.total_bytes,
        ?direction,
        "batch start"
    );

    for change in changes {
        if change.is_noop() {
            outcome.skipped += 1;
            task.advance(change.size());
            continue;
        }

        task.set_message(change.path().to_string());
        let (action, result) = match direction {
            Direction::ToTrash => ("trash", remote.trash(change)),
            Direction::FromTrash => ("untrash", remote.untrash(change)),
        };

        match result {
            Ok(()) => outcome.succeeded += 1,
            Err(source) => {
                let err = TrashError::mutation(action, change.path(), source);
                log.log_err(&err.to_string());
                outcome.failed += 1;
                outcome.failures.push(err.to_string());
            }
        }
        task.advance(change.size());
    }

    task.finish();
    info!(
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        skipped = outcome.skipped,
        "batch done"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BufferLog;
    use crate::remote::MemoryRemote;

    fn trash_changes(remote: &MemoryRemote, paths: &[&str]) -> Vec<Change> {
        paths
            .iter()
            .map(|p| Change::to_trash(*p, remote.resolve_active(p).unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn test_all_items_applied() {
        let remote = MemoryRemote::new().file("/a", 10).file("/b", 20);
        let log = BufferLog::new();
        let changes = trash_changes(&remote, &["/a", "/b"]);
        let outcome = play_change_list(&remote, &log, &changes, Direction::ToTrash);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.total_bytes, 30);
        assert!(outcome.is_clean());
        assert_eq!(remote.trash_state("/a"), Some(true));
        assert!(log.errors().is_empty());
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let remote = MemoryRemote::new()
            .file("/1", 1)
            .file("/2", 2)
            .file("/3", 3)
            .reject_mutations_for("/2");
        let log = BufferLog::new();
        let changes = trash_changes(&remote, &["/1", "/2", "/3"]);
        let outcome = play_change_list(&remote, &log, &changes, Direction::ToTrash);
        assert_eq!(remote.mutation_calls(), 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(log.errors().len(), 1);
        assert!(log.errors()[0].contains("/2"));
        assert_eq!(remote.trash_state("/3"), Some(true));
    }

    #[test]
    fn test_noops_skipped_but_counted_in_total() {
        let remote = MemoryRemote::new().file("/a", 10).trashed_file("/t", 5);
        let log = BufferLog::new();
        let noop = Change::to_trash("/t", remote.resolve_trashed("/t").unwrap()).unwrap();
        let mut changes = trash_changes(&remote, &["/a"]);
        changes.push(noop);
        let outcome = play_change_list(&remote, &log, &changes, Direction::ToTrash);
        assert_eq!(outcome.total_bytes, 15);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(remote.mutation_calls(), 1);
    }

    #[test]
    fn test_untrash_direction() {
        let remote = MemoryRemote::new().trashed_file("/a", 4);
        let log = BufferLog::new();
        let change = Change::from_trash("/a", remote.resolve_trashed("/a").unwrap()).unwrap();
        let outcome = play_change_list(&remote, &log, &[change], Direction::FromTrash);
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(remote.trash_state("/a"), Some(false));
        assert_eq!(
            outcome.summary(Direction::FromTrash),
            "Restored 1 items (4 B), 0 errors, 0 skipped"
        );
    }

    #[test]
    fn test_empty_batch() {
        let remote = MemoryRemote::new();
        let log = BufferLog::new();
        let outcome = play_change_list(&remote, &log, &[], Direction::ToTrash);
        assert_eq!(outcome, BatchOutcome::default());
    }
}
