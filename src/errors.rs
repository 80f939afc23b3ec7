//! Error types shared by the reconciler and the remote accessors.

use std::io;

/// Failures reported by a [`crate::remote::RemoteTree`] implementation.
#[derive(thiserror::Error, Debug)]
pub enum RemoteError {
    /// Nothing lives at the requested path in the requested scope.
    #[error("not found")]
    NotFound(String),

    /// The store refused a mutation.
    #[error("cannot {action} '{path}': {reason}")]
    Rejected {
        action: &'static str,
        path: String,
        reason: String,
    },

    /// Transport or backend failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RemoteError {
    pub fn rejected(
        action: &'static str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            action,
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors surfaced by trash, untrash and empty-trash operations.
#[derive(thiserror::Error, Debug)]
pub enum TrashError {
    /// The root may never be trashed.
    #[error("will not try to trash root '{0}'")]
    InvalidTarget(String),

    /// A path could not be found in the active (or trashed) tree.
    #[error("'{path}': {source}")]
    ResolutionFailure {
        path: String,
        #[source]
        source: RemoteError,
    },

    /// A match query produced no candidates.
    #[error("no matches found!")]
    NoMatches,

    /// Empty-trash could not resolve the root node.
    #[error("cannot resolve root: {0}")]
    RootUnresolvable(#[source] RemoteError),

    /// The match query itself failed.
    #[error("match query in '{scope}' failed: {source}")]
    Query {
        scope: String,
        #[source]
        source: RemoteError,
    },

    /// A trash, untrash or purge call failed remotely.
    #[error("{action} '{target}' failed: {source}")]
    MutationFailure {
        action: &'static str,
        target: String,
        #[source]
        source: RemoteError,
    },

    /// Reading the confirmation answer failed.
    #[error("failed to read confirmation: {0}")]
    Prompt(#[from] io::Error),
}

impl TrashError {
    pub fn resolution(path: impl Into<String>, source: RemoteError) -> Self {
        Self::ResolutionFailure {
            path: path.into(),
            source,
        }
    }

    pub fn mutation(action: &'static str, target: impl Into<String>, source: RemoteError) -> Self {
        Self::MutationFailure {
            action,
            target: target.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrashError>;
