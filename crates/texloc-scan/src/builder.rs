//! Flattening a path index into an ordered texture tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::trace;

use texloc_core::{ConsumerId, LocatorConfig, ScanWarning, TextureTree, TreeNode};

use crate::index::PathIndex;

/// Request to reload the host's cached preview of a file.
///
/// The builder only reports these; refreshing the preview is up to the
/// host. All consumers of a file share the image, so one is enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRefresh {
    /// Index of the file node.
    pub index: usize,
    /// First consumer of the file.
    pub consumer: ConsumerId,
    /// Absolute path of the file.
    pub path: PathBuf,
}

/// Output of one build: ordered nodes plus side-effect requests.
#[derive(Debug, Clone, Default)]
pub struct BuiltTree {
    /// Nodes in display order.
    pub nodes: Vec<TreeNode>,
    /// Preview reloads, one per file node.
    pub previews: Vec<PreviewRefresh>,
    /// References the index skipped.
    pub warnings: Vec<ScanWarning>,
}

/// Builds the ordered folder/file sequence from a [`PathIndex`].
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    expand_new_folders: bool,
    collapsed: HashSet<PathBuf>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a builder whose folders start expanded.
    pub fn new() -> Self {
        Self {
            expand_new_folders: true,
            collapsed: HashSet::new(),
        }
    }

    /// Create a builder using the folder defaults of `config`.
    pub fn with_config(config: &LocatorConfig) -> Self {
        Self {
            expand_new_folders: config.expand_new_folders,
            collapsed: HashSet::new(),
        }
    }

    /// Keep folders collapsed that were collapsed in `previous`.
    ///
    /// Only the collapsed state carries over; folders that did not exist
    /// before get the builder's default.
    pub fn carry_expansion(mut self, previous: &TextureTree) -> Self {
        self.collapsed = previous
            .iter()
            .filter(|n| !n.expanded)
            .filter_map(|n| n.folder_path())
            .map(Path::to_path_buf)
            .collect();
        self
    }

    /// Flatten `index` into display order.
    ///
    /// Directories are visited in `Path` order, which compares component by
    /// component. An ancestor therefore sorts before all of its descendants
    /// and no unrelated directory sorts between them (`/a`, `/a/b`, `/a-b`),
    /// so every folder's subtree ends up contiguous. Each folder's parent is
    /// the nearest already placed folder that contains it.
    pub fn build(&self, index: PathIndex) -> BuiltTree {
        let (mut dirs, warnings) = index.into_parts();
        let sorted: Vec<PathBuf> = dirs.keys().cloned().sorted().collect();

        let mut nodes: Vec<TreeNode> = Vec::with_capacity(sorted.len() + dirs.len());
        let mut previews = Vec::new();

        for dir in sorted {
            let parent = nodes
                .iter()
                .rev()
                .filter_map(|n| n.folder_path().map(|p| (n.index, p)))
                .find(|(_, p)| is_proper_ancestor(p, &dir))
                .map(|(i, _)| i);

            let folder_index = nodes.len();
            let expanded = self.expand_new_folders && !self.collapsed.contains(&dir);
            trace!(path = %dir.display(), ?parent, "placing folder");

            let Some(bucket) = dirs.swap_remove(&dir) else {
                continue;
            };
            nodes.push(TreeNode::new_folder(folder_index, parent, dir.clone(), expanded));

            for (name, consumers) in bucket.into_entries() {
                let index = nodes.len();
                if let Some(first) = consumers.first() {
                    previews.push(PreviewRefresh {
                        index,
                        consumer: first.clone(),
                        path: dir.join(name.as_str()),
                    });
                }
                nodes.push(TreeNode::new_file(index, folder_index, name, consumers));
            }
        }

        BuiltTree {
            nodes,
            previews,
            warnings,
        }
    }
}

fn is_proper_ancestor(ancestor: &Path, path: &Path) -> bool {
    path != ancestor && path.starts_with(ancestor)
}
