//! Selection identity that survives tree rebuilds.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::node::NodeKind;
use crate::tree::TextureTree;

/// Path-based identity of a selected node.
///
/// Node indices are recomputed on every scan, so a selection is carried
/// across a rebuild as one of these and resolved against the new tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionKey {
    /// A folder, by absolute directory path.
    Folder { path: PathBuf },
    /// A file, by containing folder and file name.
    File { folder: PathBuf, name: CompactString },
}

impl SelectionKey {
    /// Capture the identity of the node at `index`.
    ///
    /// Returns `None` if the index is out of range.
    pub fn capture(tree: &TextureTree, index: usize) -> Option<Self> {
        let node = tree.get(index)?;
        match &node.kind {
            NodeKind::Folder { path } => Some(Self::Folder { path: path.clone() }),
            NodeKind::File { name, .. } => {
                let folder = tree.get(node.parent?)?.folder_path()?;
                Some(Self::File {
                    folder: folder.to_path_buf(),
                    name: name.clone(),
                })
            }
        }
    }

    /// Folder path this identity belongs to.
    pub fn folder(&self) -> &Path {
        match self {
            Self::Folder { path } => path,
            Self::File { folder, .. } => folder,
        }
    }

    /// Find this identity in `tree`.
    ///
    /// A file resolves to the first file with the same name inside a folder
    /// with the same path. If that file is gone but its folder survived,
    /// the folder is selected instead. Returns `None` if neither survived.
    pub fn resolve(&self, tree: &TextureTree) -> Option<usize> {
        let mut folder_match = None;

        for node in tree.iter() {
            match (&node.kind, self) {
                (NodeKind::Folder { path }, _) => {
                    if folder_match.is_none() && path == self.folder() {
                        if matches!(self, Self::Folder { .. }) {
                            return Some(node.index);
                        }
                        folder_match = Some(node.index);
                    }
                }
                (NodeKind::File { name, .. }, Self::File { folder, name: wanted }) => {
                    if name == wanted
                        && node
                            .parent
                            .and_then(|p| tree.get(p))
                            .and_then(|p| p.folder_path())
                            == Some(folder.as_path())
                    {
                        return Some(node.index);
                    }
                }
                (NodeKind::File { .. }, Self::Folder { .. }) => {}
            }
        }

        folder_match
    }
}
