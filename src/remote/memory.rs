//! In-memory remote tree.
//!
//! Stands in for the network store: the CLI loads it from a JSON snapshot
//! and saves it back after mutating commands, and tests build it directly.
//! Trash state follows the usual cloud-drive model where trashing a folder
//! flags only the folder, and everything below it is effectively trashed.

use super::name_match::NameMatcher;
use super::{path_segments, Matches, RemoteTree};
use crate::change::Change;
use crate::errors::RemoteError;
use crate::node::{Node, NodeId, NodeKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const ROOT_ID: &str = "root";

/// One entry of a JSON snapshot. The root is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub trashed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug)]
struct Entry {
    name: String,
    kind: NodeKind,
    size: u64,
    trashed: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Tree {
    entries: HashMap<NodeId, Entry>,
    next_id: u64,
}

impl Tree {
    fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            NodeId(ROOT_ID.to_string()),
            Entry {
                name: String::new(),
                kind: NodeKind::Folder,
                size: 0,
                trashed: false,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            entries,
            next_id: 1,
        }
    }

    fn root_id() -> NodeId {
        NodeId(ROOT_ID.to_string())
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = NodeId(format!("n{}", self.next_id));
            self.next_id += 1;
            if !self.entries.contains_key(&id) {
                return id;
            }
        }
    }

    fn is_trashed(&self, id: &NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.entries.get(cur) {
                Some(entry) if entry.trashed => return true,
                Some(entry) => current = entry.parent.as_ref(),
                None => return false,
            }
        }
        false
    }

    fn has_trashed_ancestor(&self, id: &NodeId) -> bool {
        self.entries
            .get(id)
            .and_then(|e| e.parent.as_ref())
            .map(|parent| self.is_trashed(parent))
            .unwrap_or(false)
    }

    fn subtree_holds_trash(&self, id: &NodeId) -> bool {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(entry) = self.entries.get(cur) {
                if entry.trashed {
                    return true;
                }
                stack.extend(entry.children.iter());
            }
        }
        false
    }

    fn node(&self, id: &NodeId) -> Option<Arc<Node>> {
        self.entries.get(id).map(|entry| {
            Arc::new(Node {
                id: id.clone(),
                name: entry.name.clone(),
                kind: entry.kind,
                trashed: self.is_trashed(id),
                size: entry.size,
            })
        })
    }

    fn path_of(&self, id: &NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.entries.get(cur) {
                Some(entry) if entry.parent.is_some() => {
                    names.push(entry.name.as_str());
                    current = entry.parent.as_ref();
                }
                _ => break,
            }
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Depth-first search over same-named siblings so duplicate names
    /// resolve to whichever candidate satisfies the filters.
    fn find(
        &self,
        from: &NodeId,
        segs: &[&str],
        active_only: bool,
        trashed_leaf: bool,
    ) -> Option<NodeId> {
        let Some((head, rest)) = segs.split_first() else {
            if trashed_leaf && !self.is_trashed(from) {
                return None;
            }
            return Some(from.clone());
        };
        let entry = self.entries.get(from)?;
        entry.children.iter().find_map(|child_id| {
            let child = self.entries.get(child_id)?;
            if child.name != *head || (active_only && child.trashed) {
                return None;
            }
            self.find(child_id, rest, active_only, trashed_leaf)
        })
    }

    fn resolve(&self, path: &str, active_only: bool, trashed_leaf: bool) -> Option<NodeId> {
        let segs: Vec<&str> = path_segments(path).collect();
        self.find(&Self::root_id(), &segs, active_only, trashed_leaf)
    }

    fn attach(&mut self, parent: &NodeId, id: NodeId, entry: Entry) {
        if let Some(p) = self.entries.get_mut(parent) {
            p.children.push(id.clone());
        }
        self.entries.insert(id, entry);
    }

    fn insert_path(&mut self, path: &str, kind: NodeKind, size: u64, trashed: bool) -> NodeId {
        let segs: Vec<&str> = path_segments(path).collect();
        let mut parent = Self::root_id();
        for (i, seg) in segs.iter().enumerate() {
            let last = i + 1 == segs.len();
            let existing = self.entries.get(&parent).and_then(|p| {
                p.children
                    .iter()
                    .find(|c| self.entries.get(*c).is_some_and(|e| e.name == *seg))
                    .cloned()
            });
            match existing {
                Some(id) if !last => parent = id,
                _ if !last => {
                    let id = self.fresh_id();
                    self.attach(
                        &parent,
                        id.clone(),
                        Entry {
                            name: seg.to_string(),
                            kind: NodeKind::Folder,
                            size: 0,
                            trashed: false,
                            parent: Some(parent.clone()),
                            children: Vec::new(),
                        },
                    );
                    parent = id;
                }
                _ => {
                    let id = self.fresh_id();
                    self.attach(
                        &parent,
                        id.clone(),
                        Entry {
                            name: seg.to_string(),
                            kind,
                            size,
                            trashed,
                            parent: Some(parent.clone()),
                            children: Vec::new(),
                        },
                    );
                    return id;
                }
            }
        }
        parent
    }

    fn insert_snapshot(&mut self, parent: &NodeId, item: &SnapshotEntry) {
        let id = match &item.id {
            Some(id) if !self.entries.contains_key(&NodeId(id.clone())) => NodeId(id.clone()),
            _ => self.fresh_id(),
        };
        self.attach(
            parent,
            id.clone(),
            Entry {
                name: item.name.clone(),
                kind: item.kind,
                size: item.size,
                trashed: item.trashed,
                parent: Some(parent.clone()),
                children: Vec::new(),
            },
        );
        for child in &item.children {
            self.insert_snapshot(&id, child);
        }
    }

    fn snapshot_of(&self, id: &NodeId) -> Option<SnapshotEntry> {
        let entry = self.entries.get(id)?;
        Some(SnapshotEntry {
            name: entry.name.clone(),
            kind: entry.kind,
            id: Some(id.0.clone()),
            size: entry.size,
            trashed: entry.trashed,
            children: entry
                .children
                .iter()
                .filter_map(|c| self.snapshot_of(c))
                .collect(),
        })
    }

    fn remove_subtree(&mut self, id: &NodeId) -> usize {
        let Some(entry) = self.entries.remove(id) else {
            return 0;
        };
        if let Some(parent) = entry.parent.as_ref().and_then(|p| self.entries.get_mut(p)) {
            parent.children.retain(|c| c != id);
        }
        let mut removed = 1;
        let mut stack = entry.children;
        while let Some(child) = stack.pop() {
            if let Some(e) = self.entries.remove(&child) {
                removed += 1;
                stack.extend(e.children);
            }
        }
        removed
    }
}

/// Remote tree held entirely in memory.
#[derive(Debug)]
pub struct MemoryRemote {
    tree: Mutex<Tree>,
    rejected: Mutex<HashSet<String>>,
    mutation_calls: AtomicUsize,
    purge_calls: AtomicUsize,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            tree: Mutex::new(Tree::new()),
            rejected: Mutex::new(HashSet::new()),
            mutation_calls: AtomicUsize::new(0),
            purge_calls: AtomicUsize::new(0),
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert an entry, creating missing parent folders.
    pub fn add(&self, path: &str, kind: NodeKind, size: u64, trashed: bool) -> NodeId {
        self.tree().insert_path(path, kind, size, trashed)
    }

    pub fn file(self, path: &str, size: u64) -> Self {
        self.add(path, NodeKind::File, size, false);
        self
    }

    pub fn folder(self, path: &str) -> Self {
        self.add(path, NodeKind::Folder, 0, false);
        self
    }

    pub fn shortcut(self, path: &str) -> Self {
        self.add(path, NodeKind::Shortcut, 0, false);
        self
    }

    pub fn trashed_file(self, path: &str, size: u64) -> Self {
        self.add(path, NodeKind::File, size, true);
        self
    }

    pub fn trashed_folder(self, path: &str) -> Self {
        self.add(path, NodeKind::Folder, 0, true);
        self
    }

    /// Make any mutation for a change at `path` fail.
    pub fn reject_mutations_for(self, path: &str) -> Self {
        self.rejected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.to_string());
        self
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub fn purge_calls(&self) -> usize {
        self.purge_calls.load(Ordering::SeqCst)
    }

    /// `Some(trashed)` for an existing path, `None` when nothing lives there.
    pub fn trash_state(&self, path: &str) -> Option<bool> {
        let tree = self.tree();
        tree.resolve(path, false, false).map(|id| tree.is_trashed(&id))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.trash_state(path).is_some()
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let remote = Self::new();
        {
            let mut tree = remote.tree();
            for item in &snapshot.entries {
                tree.insert_snapshot(&Tree::root_id(), item);
            }
        }
        remote
    }

    pub fn to_snapshot(&self) -> Snapshot {
        let tree = self.tree();
        let entries = tree
            .entries
            .get(&Tree::root_id())
            .map(|root| {
                root.children
                    .iter()
                    .filter_map(|c| tree.snapshot_of(c))
                    .collect()
            })
            .unwrap_or_default();
        Snapshot { entries }
    }

    /// Load a JSON snapshot. A missing file yields an empty tree.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        Ok(Self::from_snapshot(&snapshot))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
        }
        let json = serde_json::to_string_pretty(&self.to_snapshot())
            .context("Failed to serialize snapshot")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        Ok(())
    }

    fn check_rejected(&self, action: &'static str, change: &Change) -> Result<(), RemoteError> {
        let rejected = self
            .rejected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if rejected.contains(change.path()) {
            return Err(RemoteError::rejected(action, change.path(), "rejected by remote"));
        }
        Ok(())
    }
}

impl RemoteTree for MemoryRemote {
    fn resolve_active(&self, path: &str) -> Result<Arc<Node>, RemoteError> {
        let tree = self.tree();
        tree.resolve(path, true, false)
            .and_then(|id| tree.node(&id))
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))
    }

    fn resolve_trashed(&self, path: &str) -> Result<Arc<Node>, RemoteError> {
        let tree = self.tree();
        tree.resolve(path, false, true)
            .and_then(|id| tree.node(&id))
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))
    }

    fn match_query<'a>(
        &'a self,
        scope: &str,
        terms: &[String],
        in_trash: bool,
    ) -> Result<Matches<'a>, RemoteError> {
        let matcher = NameMatcher::new(terms).map_err(|e| RemoteError::Other(e.into()))?;
        let tree = self.tree();
        let scope_id = tree
            .resolve(scope, false, false)
            .ok_or_else(|| RemoteError::NotFound(scope.to_string()))?;
        let children = tree
            .entries
            .get(&scope_id)
            .map(|e| e.children.clone())
            .unwrap_or_default();
        let found: Vec<Arc<Node>> = children
            .iter()
            .filter_map(|id| tree.node(id))
            .filter(|node| node.trashed == in_trash && matcher.is_match(&node.name))
            .collect();
        debug!(scope, in_trash, matches = found.len(), "match query");
        Ok(Box::new(found.into_iter().map(Some)))
    }

    fn children_in_trash(&self, node: &Node) -> Result<Vec<Arc<Node>>, RemoteError> {
        let tree = self.tree();
        let entry = tree
            .entries
            .get(&node.id)
            .ok_or_else(|| RemoteError::NotFound(node.name.clone()))?;
        Ok(entry
            .children
            .iter()
            .filter(|c| tree.is_trashed(c) || tree.subtree_holds_trash(c))
            .filter_map(|c| tree.node(c))
            .collect())
    }

    fn trash(&self, change: &Change) -> Result<(), RemoteError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.check_rejected("trash", change)?;
        let target = change
            .after()
            .ok_or_else(|| RemoteError::rejected("trash", change.path(), "change has no target"))?;
        if target.id == Tree::root_id() {
            return Err(RemoteError::rejected("trash", change.path(), "the root cannot be trashed"));
        }
        let mut tree = self.tree();
        if tree.is_trashed(&target.id) {
            return Err(RemoteError::rejected("trash", change.path(), "already in trash"));
        }
        let entry = tree
            .entries
            .get_mut(&target.id)
            .ok_or_else(|| RemoteError::NotFound(change.path().to_string()))?;
        entry.trashed = true;
        debug!(path = change.path(), id = %target.id, "trashed");
        Ok(())
    }

    fn untrash(&self, change: &Change) -> Result<(), RemoteError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.check_rejected("untrash", change)?;
        let source = change.before().ok_or_else(|| {
            RemoteError::rejected("untrash", change.path(), "change has no source")
        })?;
        let mut tree = self.tree();
        if tree.has_trashed_ancestor(&source.id) {
            return Err(RemoteError::rejected(
                "untrash",
                change.path(),
                "parent folder is in trash",
            ));
        }
        let entry = tree
            .entries
            .get_mut(&source.id)
            .ok_or_else(|| RemoteError::NotFound(change.path().to_string()))?;
        if !entry.trashed {
            return Err(RemoteError::rejected("untrash", change.path(), "not in trash"));
        }
        entry.trashed = false;
        debug!(path = change.path(), id = %source.id, "untrashed");
        Ok(())
    }

    fn purge_all_trash(&self) -> Result<(), RemoteError> {
        self.purge_calls.fetch_add(1, Ordering::SeqCst);
        let mut tree = self.tree();
        let flagged: Vec<NodeId> = tree
            .entries
            .iter()
            .filter(|(id, e)| e.trashed && **id != Tree::root_id())
            .map(|(id, _)| id.clone())
            .collect();
        let removed: usize = flagged.iter().map(|id| tree.remove_subtree(id)).sum();
        debug!(removed, "purged trash");
        Ok(())
    }
}

impl MemoryRemote {
    /// Logical path of a node currently in the tree.
    pub fn path_of(&self, id: &NodeId) -> Option<String> {
        let tree = self.tree();
        tree.entries.contains_key(id).then(|| tree.path_of(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryRemote {
        MemoryRemote::new()
            .file("/a.txt", 10)
            .file("/docs/x", 5)
            .trashed_file("/docs/y", 7)
            .trashed_folder("/old")
            .file("/old/inner.txt", 3)
    }

    #[test]
    fn test_resolve_active_skips_trashed() {
        let remote = sample();
        assert_eq!(remote.resolve_active("/a.txt").unwrap().size, 10);
        assert!(remote.resolve_active("/docs/y").unwrap_err().is_not_found());
        assert!(remote.resolve_active("/old/inner.txt").is_err());
        assert_eq!(remote.resolve_active("/").unwrap().name, "");
    }

    #[test]
    fn test_resolve_trashed_includes_descendants() {
        let remote = sample();
        assert!(remote.resolve_trashed("/docs/y").unwrap().trashed);
        assert!(remote.resolve_trashed("/old/inner.txt").unwrap().trashed);
        assert!(remote.resolve_trashed("/a.txt").is_err());
        assert!(remote.resolve_trashed("/").is_err());
    }

    #[test]
    fn test_duplicate_names_resolve_by_state() {
        let remote = MemoryRemote::new().trashed_file("/dup", 1);
        remote.add("/dup", NodeKind::File, 2, false);
        assert_eq!(remote.resolve_active("/dup").unwrap().size, 2);
        assert_eq!(remote.resolve_trashed("/dup").unwrap().size, 1);
    }

    #[test]
    fn test_children_in_trash_follows_active_folders() {
        let remote = sample();
        let root = remote.resolve_active("/").unwrap();
        let mut names: Vec<String> = remote
            .children_in_trash(&root)
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        names.sort();
        assert_eq!(names, vec!["docs", "old"]);
    }

    #[test]
    fn test_match_query_filters_by_state() {
        let remote = sample();
        let active: Vec<String> = remote
            .match_query("/docs", &[], false)
            .unwrap()
            .flatten()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(active, vec!["x"]);
        let trashed: Vec<String> = remote
            .match_query("/docs", &["Y".to_string()], true)
            .unwrap()
            .flatten()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(trashed, vec!["y"]);
        assert!(remote.match_query("/nope", &[], false).is_err());
    }

    #[test]
    fn test_trash_and_untrash() {
        let remote = sample();
        let node = remote.resolve_active("/a.txt").unwrap();
        let change = Change::to_trash("/a.txt", node).unwrap();
        remote.trash(&change).unwrap();
        assert_eq!(remote.trash_state("/a.txt"), Some(true));
        assert!(remote.trash(&change).is_err());

        let node = remote.resolve_trashed("/a.txt").unwrap();
        let change = Change::from_trash("/a.txt", node).unwrap();
        remote.untrash(&change).unwrap();
        assert_eq!(remote.trash_state("/a.txt"), Some(false));
        assert_eq!(remote.mutation_calls(), 3);
    }

    #[test]
    fn test_untrash_under_trashed_parent_is_rejected() {
        let remote = sample();
        let node = remote.resolve_trashed("/old/inner.txt").unwrap();
        let change = Change::from_trash("/old/inner.txt", node).unwrap();
        assert!(matches!(
            remote.untrash(&change),
            Err(RemoteError::Rejected { .. })
        ));
    }

    #[test]
    fn test_root_node_is_never_trashed() {
        let remote = sample();
        let root = remote.resolve_active("/").unwrap();
        let change = Change::to_trash("/alias", root).unwrap();
        assert!(matches!(
            remote.trash(&change),
            Err(RemoteError::Rejected { .. })
        ));
        assert_eq!(remote.trash_state("/a.txt"), Some(false));
        remote.purge_all_trash().unwrap();
        assert!(remote.resolve_active("/").is_ok());
        assert!(remote.exists("/a.txt"));
    }

    #[test]
    fn test_rejected_paths() {
        let remote = sample().reject_mutations_for("/a.txt");
        let node = remote.resolve_active("/a.txt").unwrap();
        let change = Change::to_trash("/a.txt", node).unwrap();
        assert!(remote.trash(&change).is_err());
        assert_eq!(remote.trash_state("/a.txt"), Some(false));
    }

    #[test]
    fn test_purge_removes_trashed_subtrees() {
        let remote = sample();
        remote.purge_all_trash().unwrap();
        assert!(!remote.exists("/docs/y"));
        assert!(!remote.exists("/old"));
        assert!(!remote.exists("/old/inner.txt"));
        assert!(remote.exists("/docs/x"));
        assert_eq!(remote.purge_calls(), 1);
    }

    #[test]
    fn test_snapshot_roundtrip_keeps_ids() {
        let remote = sample();
        let id = remote.resolve_active("/docs/x").unwrap().id.clone();
        let restored = MemoryRemote::from_snapshot(&remote.to_snapshot());
        assert_eq!(restored.resolve_active("/docs/x").unwrap().id, id);
        assert_eq!(restored.path_of(&id).as_deref(), Some("/docs/x"));
        assert_eq!(restored.trash_state("/old/inner.txt"), Some(true));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let remote = MemoryRemote::load(&dir.path().join("none.json")).unwrap();
        assert!(remote.to_snapshot().entries.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tree.json");
        sample().save(&path).unwrap();
        let loaded = MemoryRemote::load(&path).unwrap();
        assert_eq!(loaded.trash_state("/docs/y"), Some(true));
        assert_eq!(loaded.resolve_active("/a.txt").unwrap().size, 10);
    }
}
