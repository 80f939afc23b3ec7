//! Breadth-first walk of the trashed subtree.
//!
//! The walk is queue driven: every expanded node yields fresh
//! [`TraversalState`] values for its children, nothing is mutated in place.
//! A visited set keyed by node id guards against a remote that reports a
//! cycle.

use crate::node::{Node, NodeId, TypeMask};
use crate::progress::Spinner;
use crate::remote::{join_path, RemoteTree};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TraversalState {
    /// `-1` marks the start state; children sit one level deeper.
    pub depth: i32,
    pub node: Arc<Node>,
    pub head_path: String,
    pub in_trash: bool,
    pub mask: TypeMask,
}

impl TraversalState {
    /// Start state for a walk over the whole trash.
    pub fn trash_root(node: Arc<Node>, mask: TypeMask) -> Self {
        Self {
            depth: -1,
            node,
            head_path: "/".to_string(),
            in_trash: true,
            mask,
        }
    }

    pub fn descend(&self, child: Arc<Node>) -> Self {
        Self {
            depth: self.depth + 1,
            head_path: join_path(&self.head_path, &child.name),
            node: child,
            in_trash: self.in_trash,
            mask: self.mask,
        }
    }

    pub fn is_start(&self) -> bool {
        self.depth < 0
    }

    fn is_reportable(&self) -> bool {
        if self.is_start() {
            return false;
        }
        if self.in_trash && !self.node.trashed {
            return false;
        }
        self.mask.includes(self.node.kind)
    }
}

#[derive(Debug, Clone)]
pub struct Visit {
    pub path: String,
    pub node: Arc<Node>,
}

#[derive(Debug, Clone, Default)]
pub struct TraversalReport {
    pub items: Vec<Visit>,
    /// Number of states taken off the queue, including the start state.
    pub visited: usize,
    /// Folders whose children could not be listed.
    pub unreadable: usize,
}

impl TraversalReport {
    pub fn found_any(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.items.iter().map(|v| v.node.size).sum()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.items.iter().map(|v| v.path.as_str()).collect()
    }
}

pub struct Traversal<'a, R: RemoteTree + ?Sized> {
    remote: &'a R,
    max_depth: Option<u32>,
}

impl<'a, R: RemoteTree + ?Sized> Traversal<'a, R> {
    pub fn new(remote: &'a R) -> Self {
        Self {
            remote,
            max_depth: None,
        }
    }

    /// Limit expansion to `max_depth` levels below the start state.
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn may_expand(&self, state: &TraversalState) -> bool {
        if !state.node.is_folder() {
            return false;
        }
        match self.max_depth {
            None => true,
            Some(limit) => i64::from(state.depth) + 1 < i64::from(limit),
        }
    }

    pub fn breadth_first(&self, start: TraversalState, spinner: &Spinner) -> TraversalReport {
        let mut report = TraversalReport::default();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(state) = queue.pop_front() {
            if !seen.insert(state.node.id.clone()) {
                warn!(path = %state.head_path, id = %state.node.id, "node revisited, skipping");
                continue;
            }
            report.visited += 1;
            spinner.set_message(format!("Scanning trash: {}", state.head_path));

            if state.is_reportable() {
                report.items.push(Visit {
                    path: state.head_path.clone(),
                    node: state.node.clone(),
                });
            }

            if !self.may_expand(&state) {
                continue;
            }

            match self.remote.children_in_trash(&state.node) {
                Ok(children) => {
                    queue.extend(children.into_iter().map(|child| state.descend(child)));
                }
                Err(err) => {
                    report.unreadable += 1;
                    warn!(path = %state.head_path, error = %err, "cannot list children");
                }
            }
        }

        debug!(
            visited = report.visited,
            matched = report.items.len(),
            unreadable = report.unreadable,
            "trash walk finished"
        );
        report
    }
}

/// Convenience wrapper used by empty-trash: walk the entire trash from `root`.
pub fn walk_trash<R: RemoteTree + ?Sized>(
    remote: &R,
    root: Arc<Node>,
    mask: TypeMask,
    max_depth: Option<u32>,
    spinner: &Spinner,
) -> TraversalReport {
    Traversal::new(remote)
        .with_max_depth(max_depth)
        .breadth_first(TraversalState::trash_root(root, mask), spinner)
}
