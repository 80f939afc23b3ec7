//! Remote tree accessor boundary.
//!
//! The reconciler never talks to the store directly; everything goes
//! through [`RemoteTree`]. Implementations own the node cache and are
//! responsible for their own internal consistency, so every method takes
//! `&self`.

pub mod memory;
pub mod name_match;

use crate::change::Change;
use crate::errors::RemoteError;
use crate::node::Node;
use std::sync::Arc;

pub use memory::MemoryRemote;

/// Lazy sequence of match results. `None` entries are placeholders the
/// consumer must skip.
pub type Matches<'a> = Box<dyn Iterator<Item = Option<Arc<Node>>> + 'a>;

pub trait RemoteTree {
    /// Resolve a path in the active (not trashed) tree.
    fn resolve_active(&self, path: &str) -> Result<Arc<Node>, RemoteError>;

    /// Resolve a path whose final entry is in trash.
    fn resolve_trashed(&self, path: &str) -> Result<Arc<Node>, RemoteError>;

    /// Children of `scope` whose names match any of `terms` and whose trash
    /// state equals `in_trash`.
    fn match_query<'a>(
        &'a self,
        scope: &str,
        terms: &[String],
        in_trash: bool,
    ) -> Result<Matches<'a>, RemoteError>;

    /// Children of `node` that lie in, or lead into, the trash.
    fn children_in_trash(&self, node: &Node) -> Result<Vec<Arc<Node>>, RemoteError>;

    fn trash(&self, change: &Change) -> Result<(), RemoteError>;

    fn untrash(&self, change: &Change) -> Result<(), RemoteError>;

    /// Irreversibly delete everything in trash.
    fn purge_all_trash(&self) -> Result<(), RemoteError>;
}

impl<T: RemoteTree + ?Sized> RemoteTree for &T {
    fn resolve_active(&self, path: &str) -> Result<Arc<Node>, RemoteError> {
        (**self).resolve_active(path)
    }

    fn resolve_trashed(&self, path: &str) -> Result<Arc<Node>, RemoteError> {
        (**self).resolve_trashed(path)
    }

    fn match_query<'a>(
        &'a self,
        scope: &str,
        terms: &[String],
        in_trash: bool,
    ) -> Result<Matches<'a>, RemoteError> {
        (**self).match_query(scope, terms, in_trash)
    }

    fn children_in_trash(&self, node: &Node) -> Result<Vec<Arc<Node>>, RemoteError> {
        (**self).children_in_trash(node)
    }

    fn trash(&self, change: &Change) -> Result<(), RemoteError> {
        (**self).trash(change)
    }

    fn untrash(&self, change: &Change) -> Result<(), RemoteError> {
        (**self).untrash(change)
    }

    fn purge_all_trash(&self) -> Result<(), RemoteError> {
        (**self).purge_all_trash()
    }
}

/// Split a logical path into its non-empty segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

/// Join a parent path and a child name without doubling the separator.
pub fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches('/');
    format!("{parent}/{name}")
}
