//! Remote tree entries and the type mask used to filter them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
    Shortcut,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
            Self::Shortcut => "shortcut",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote store entry as seen by the reconciler.
///
/// `trashed` is the effective state: an entry sitting inside a trashed
/// folder reports `true` even if it was never trashed on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub trashed: bool,
    pub size: u64,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId(id.into()),
            name: name.into(),
            kind,
            trashed: false,
            size: 0,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn trashed(mut self, trashed: bool) -> Self {
        self.trashed = trashed;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

/// Bitmask selecting which node kinds take part in a traversal or match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeMask(u8);

impl TypeMask {
    pub const NONE: TypeMask = TypeMask(0);
    pub const FOLDER: TypeMask = TypeMask(1 << 0);
    pub const FILE: TypeMask = TypeMask(1 << 1);
    pub const SHORTCUT: TypeMask = TypeMask(1 << 2);
    pub const ALL: TypeMask = TypeMask(0b111);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn includes(&self, kind: NodeKind) -> bool {
        self.0 & Self::for_kind(kind).0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn for_kind(kind: NodeKind) -> TypeMask {
        match kind {
            NodeKind::Folder => Self::FOLDER,
            NodeKind::File => Self::FILE,
            NodeKind::Shortcut => Self::SHORTCUT,
        }
    }

    /// Parse a single mask name (`folder`, `file`, `shortcut`, `all`).
    pub fn parse_name(name: &str) -> Option<TypeMask> {
        match name.trim().to_lowercase().as_str() {
            "folder" | "folders" | "dir" => Some(Self::FOLDER),
            "file" | "files" => Some(Self::FILE),
            "shortcut" | "shortcuts" => Some(Self::SHORTCUT),
            "all" => Some(Self::ALL),
            _ => None,
        }
    }

    /// Combine several mask names. An empty list selects everything.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<TypeMask, String> {
        if names.is_empty() {
            return Ok(Self::ALL);
        }
        names.iter().try_fold(Self::NONE, |mask, name| {
            Self::parse_name(name.as_ref())
                .map(|m| mask | m)
                .ok_or_else(|| format!("unknown node type: {}", name.as_ref()))
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        [NodeKind::Folder, NodeKind::File, NodeKind::Shortcut]
            .into_iter()
            .filter(|k| self.includes(*k))
            .map(|k| k.as_str())
            .collect()
    }
}

impl Default for TypeMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::ops::BitOr for TypeMask {
    type Output = TypeMask;

    fn bitor(self, rhs: TypeMask) -> TypeMask {
        TypeMask(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_includes() {
        let mask = TypeMask::FOLDER | TypeMask::SHORTCUT;
        assert!(mask.includes(NodeKind::Folder));
        assert!(mask.includes(NodeKind::Shortcut));
        assert!(!mask.includes(NodeKind::File));
        assert!(TypeMask::ALL.includes(NodeKind::File));
        assert!(!TypeMask::NONE.includes(NodeKind::Folder));
    }

    #[test]
    fn test_mask_from_names() {
        assert_eq!(
            TypeMask::from_names(&["file", "Folder"]).unwrap(),
            TypeMask::FILE | TypeMask::FOLDER
        );
        assert_eq!(TypeMask::from_names::<&str>(&[]).unwrap(), TypeMask::ALL);
        assert!(TypeMask::from_names(&["socket"]).is_err());
    }

    #[test]
    fn test_mask_names() {
        assert_eq!(TypeMask::ALL.names(), vec!["folder", "file", "shortcut"]);
        assert_eq!(TypeMask::FILE.names(), vec!["file"]);
    }
}
