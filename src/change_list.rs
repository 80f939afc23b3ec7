//! Change-list builder.
//!
//! Three strategies feed the same gate and executor: explicit paths, a
//! match query, and a full walk of the trash.

use crate::change::{is_root, Change, Direction};
use crate::errors::{Result, TrashError};
use crate::node::{Node, TypeMask};
use crate::output::Log;
use crate::progress::Spinner;
use crate::remote::{join_path, path_segments, RemoteTree};
use crate::traversal::{walk_trash, TraversalReport};
use tracing::debug;

/// Resolve one path into a change.
///
/// Trashing the root is refused before any lookup is made, and again if a
/// path that does not look like the root still resolves to the root node.
pub fn resolve_change<R: RemoteTree + ?Sized>(
    remote: &R,
    path: &str,
    direction: Direction,
) -> Result<Change> {
    if is_root(path) && direction.is_to_trash() {
        return Err(TrashError::InvalidTarget(path.to_string()));
    }
    match direction {
        Direction::ToTrash => {
            let node = remote
                .resolve_active(path)
                .map_err(|e| TrashError::resolution(path, e))?;
            if is_root_node(remote, &node) {
                return Err(TrashError::InvalidTarget(path.to_string()));
            }
            Change::to_trash(path, node)
        }
        Direction::FromTrash => {
            let node = remote
                .resolve_trashed(path)
                .map_err(|e| TrashError::resolution(path, e))?;
            Change::from_trash(path, node)
        }
    }
}

fn is_root_node<R: RemoteTree + ?Sized>(remote: &R, node: &Node) -> bool {
    remote
        .resolve_active("/")
        .is_ok_and(|root| root.id == node.id)
}

/// Canonical prefix for paths under `scope`: empty for the root, otherwise
/// `/` followed by the scope's segments.
fn scope_prefix(scope: &str) -> String {
    path_segments(scope).fold(String::new(), |mut prefix, seg| {
        prefix.push('/');
        prefix.push_str(seg);
        prefix
    })
}

/// Explicit-path strategy. Unresolvable paths are reported and skipped.
pub fn reduce<R: RemoteTree + ?Sized, S: AsRef<str>>(
    remote: &R,
    log: &dyn Log,
    paths: &[S],
    direction: Direction,
) -> Vec<Change> {
    let mut changes = Vec::with_capacity(paths.len());
    for path in paths {
        match resolve_change(remote, path.as_ref(), direction) {
            Ok(change) => changes.push(change),
            Err(err) => {
                debug!(path = path.as_ref(), error = %err, "skipping path");
                log.log_err(&err.to_string());
            }
        }
    }
    changes
}

/// Match-query strategy.
///
/// `in_trash` selects the trashed side (untrash) or the active side (trash).
pub fn by_match<R: RemoteTree + ?Sized, S: AsRef<str>>(
    remote: &R,
    scope: &str,
    terms: &[S],
    in_trash: bool,
) -> Result<Vec<Change>> {
    let terms: Vec<String> = terms.iter().map(|t| t.as_ref().to_string()).collect();
    let matches = remote
        .match_query(scope, &terms, in_trash)
        .map_err(|source| TrashError::Query {
            scope: scope.to_string(),
            source,
        })?;

    let prefix = scope_prefix(scope);

    let mut changes = Vec::new();
    for node in matches.flatten() {
        let path = join_path(&prefix, &node.name);
        let change = if in_trash {
            Change::from_trash(path, node)?
        } else {
            Change::to_trash(path, node)?
        };
        changes.push(change);
    }

    if changes.is_empty() {
        return Err(TrashError::NoMatches);
    }
    debug!(scope, in_trash, count = changes.len(), "match changes built");
    Ok(changes)
}

/// Bulk-empty discovery: resolve the root, then walk everything in trash.
pub fn scan_trash<R: RemoteTree + ?Sized>(
    remote: &R,
    mask: TypeMask,
    max_depth: Option<u32>,
    spinner: &Spinner,
) -> Result<TraversalReport> {
    let root = remote
        .resolve_active("/")
        .map_err(TrashError::RootUnresolvable)?;
    Ok(walk_trash(remote, root, mask, max_depth, spinner))
}
