//! Folder and file node types.

use std::fmt;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a texture consumer (e.g. an image datablock).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumerId(pub CompactString);

impl ConsumerId {
    /// Create a new ConsumerId.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConsumerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Type of tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A directory grouping files and nested folders.
    Folder {
        /// Absolute directory path.
        path: PathBuf,
    },
    /// A single image file.
    File {
        /// File name only; the directory is the parent folder's path.
        name: CompactString,
        /// Consumers resolving to this file, in first-seen order. Never empty.
        consumers: Vec<ConsumerId>,
    },
}

impl NodeKind {
    /// Check if this is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, NodeKind::Folder { .. })
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File { .. })
    }
}

/// A single entry in the ordered texture tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Position in the ordered sequence. Only valid for one build.
    pub index: usize,

    /// Index of the containing folder, `None` for root folders.
    pub parent: Option<usize>,

    /// Node type and associated data.
    pub kind: NodeKind,

    /// Whether children are shown. Stored on every node, only read for folders.
    pub expanded: bool,
}

impl TreeNode {
    /// Create a new folder node.
    pub fn new_folder(
        index: usize,
        parent: Option<usize>,
        path: impl Into<PathBuf>,
        expanded: bool,
    ) -> Self {
        Self {
            index,
            parent,
            kind: NodeKind::Folder { path: path.into() },
            expanded,
        }
    }

    /// Create a new file node.
    ///
    /// `consumers` must not be empty; the tree builder only creates files
    /// for names that at least one reference resolved to.
    pub fn new_file(
        index: usize,
        parent: usize,
        name: impl Into<CompactString>,
        consumers: Vec<ConsumerId>,
    ) -> Self {
        debug_assert!(!consumers.is_empty(), "file node without consumers");
        Self {
            index,
            parent: Some(parent),
            kind: NodeKind::File {
                name: name.into(),
                consumers,
            },
            expanded: true,
        }
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Check if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The node's own path: absolute for folders, the bare name for files.
    pub fn path(&self) -> &Path {
        match &self.kind {
            NodeKind::Folder { path } => path,
            NodeKind::File { name, .. } => Path::new(name.as_str()),
        }
    }

    /// Absolute directory path of a folder node.
    pub fn folder_path(&self) -> Option<&Path> {
        match &self.kind {
            NodeKind::Folder { path } => Some(path),
            NodeKind::File { .. } => None,
        }
    }

    /// File name of a file node.
    pub fn file_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { name, .. } => Some(name.as_str()),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Consumers of a file node; empty for folders.
    pub fn consumers(&self) -> &[ConsumerId] {
        match &self.kind {
            NodeKind::File { consumers, .. } => consumers,
            NodeKind::Folder { .. } => &[],
        }
    }
}
