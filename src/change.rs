//! The unit of intended mutation.
//!
//! A [`Change`] pairs a logical path with the node state it moves from
//! (`before`) and the node state it moves to (`after`). The operation is
//! resolved once at construction so the confirmation gate and the executor
//! never have to re-derive it.

use crate::errors::{Result, TrashError};
use crate::node::Node;
use crate::remote::path_segments;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    None,
    Trash,
    Untrash,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Trash => "trash",
            Self::Untrash => "untrash",
        }
    }

    /// Label used when rendering a change list.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "-",
            Self::Trash => "Trash",
            Self::Untrash => "Untrash",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way a batch moves items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToTrash,
    FromTrash,
}

impl Direction {
    pub fn from_to_trash(to_trash: bool) -> Self {
        if to_trash {
            Self::ToTrash
        } else {
            Self::FromTrash
        }
    }

    pub fn is_to_trash(&self) -> bool {
        *self == Self::ToTrash
    }

    /// The operation a change in this direction is expected to carry.
    pub fn operation(&self) -> Operation {
        match self {
            Self::ToTrash => Operation::Trash,
            Self::FromTrash => Operation::Untrash,
        }
    }
}

/// Returns true for any spelling of the root: `/`, `//`, `/.`, `.` and the
/// empty path all name no segment at all.
pub fn is_root(path: &str) -> bool {
    path_segments(path).next().is_none()
}

#[derive(Debug, Clone)]
pub struct Change {
    path: String,
    before: Option<Arc<Node>>,
    after: Option<Arc<Node>>,
    operation: Operation,
}

impl Change {
    /// Build a change from an explicit before/after pair.
    ///
    /// Fails with [`TrashError::InvalidTarget`] when the root is the target
    /// of a trash, either by derivation or by an after-only pair.
    pub fn new(
        path: impl Into<String>,
        before: Option<Arc<Node>>,
        after: Option<Arc<Node>>,
    ) -> Result<Self> {
        let path = path.into();
        let operation = derive_operation(before.as_deref(), after.as_deref());
        let trash_intent = operation == Operation::Trash || (before.is_none() && after.is_some());
        if trash_intent && is_root(&path) {
            return Err(TrashError::InvalidTarget(path));
        }
        Ok(Self {
            path,
            before,
            after,
            operation,
        })
    }

    /// A change slating the active node at `path` for trashing.
    pub fn to_trash(path: impl Into<String>, node: Arc<Node>) -> Result<Self> {
        Self::new(path, None, Some(node))
    }

    /// A change restoring the trashed node at `path`.
    pub fn from_trash(path: impl Into<String>, node: Arc<Node>) -> Result<Self> {
        Self::new(path, Some(node), None)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn before(&self) -> Option<&Arc<Node>> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&Arc<Node>> {
        self.after.as_ref()
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn is_noop(&self) -> bool {
        self.operation == Operation::None
    }

    /// The node a mutation acts on: the source for untrash, the target otherwise.
    pub fn subject(&self) -> Option<&Arc<Node>> {
        match self.operation {
            Operation::Untrash => self.before.as_ref(),
            _ => self.after.as_ref().or(self.before.as_ref()),
        }
    }

    /// Bytes attributable to the `after` side and the `before` side.
    pub fn sizes(&self) -> (u64, u64) {
        (
            self.after.as_ref().map_or(0, |n| n.size),
            self.before.as_ref().map_or(0, |n| n.size),
        )
    }

    pub fn size(&self) -> u64 {
        let (after, before) = self.sizes();
        after + before
    }
}

fn derive_operation(before: Option<&Node>, after: Option<&Node>) -> Operation {
    match (before, after) {
        (None, None) => Operation::None,
        (None, Some(after)) if !after.trashed => Operation::Trash,
        (Some(before), None) if before.trashed => Operation::Untrash,
        (Some(before), Some(after)) if before.id == after.id => {
            match (before.trashed, after.trashed) {
                (false, true) => Operation::Trash,
                (true, false) => Operation::Untrash,
                _ => Operation::None,
            }
        }
        _ => Operation::None,
    }
}

/// Sum of `after` and `before` sizes over a change list, no-ops included.
pub fn total_size(changes: &[Change]) -> u64 {
    changes.iter().map(Change::size).sum()
}
