//! Ordered texture tree container and queries.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::encoding::relative_to;
use crate::error::{LocateError, ScanWarning};
use crate::node::{ConsumerId, NodeKind, TreeNode};

/// Summary statistics for a built tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Number of folder nodes.
    pub total_folders: usize,
    /// Number of file nodes.
    pub total_files: usize,
    /// Number of consumer entries across all files.
    pub total_consumers: usize,
    /// Number of root folders.
    pub root_folders: usize,
    /// Deepest folder nesting (root folders are depth 0).
    pub max_depth: usize,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a folder at `depth`.
    pub fn record_folder(&mut self, depth: usize) {
        self.total_folders += 1;
        if depth == 0 {
            self.root_folders += 1;
        }
        self.max_depth = self.max_depth.max(depth);
    }

    /// Update stats with a file shared by `consumers` consumers.
    pub fn record_file(&mut self, consumers: usize) {
        self.total_files += 1;
        self.total_consumers += consumers;
    }
}

/// The flattened folder/file tree of one scan.
///
/// Nodes are stored in display order. Every parent precedes its children
/// and every folder's descendants occupy the indices immediately after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureTree {
    nodes: Vec<TreeNode>,

    /// Summary statistics.
    pub stats: TreeStats,

    /// References skipped while building.
    pub warnings: Vec<ScanWarning>,

    /// When this tree was built.
    pub scanned_at: SystemTime,

    /// Time taken to build the tree.
    pub scan_duration: Duration,
}

impl Default for TextureTree {
    fn default() -> Self {
        Self::from_nodes(Vec::new())
    }
}

impl TextureTree {
    /// Create a new tree from ordered nodes.
    pub fn new(nodes: Vec<TreeNode>, warnings: Vec<ScanWarning>, scan_duration: Duration) -> Self {
        let mut stats = TreeStats::new();
        for node in &nodes {
            match &node.kind {
                NodeKind::Folder { .. } => {
                    let depth = ancestor_count(&nodes, node.index);
                    stats.record_folder(depth);
                }
                NodeKind::File { consumers, .. } => stats.record_file(consumers.len()),
            }
        }

        Self {
            nodes,
            stats,
            warnings,
            scanned_at: SystemTime::now(),
            scan_duration,
        }
    }

    /// Create a tree from ordered nodes without warnings or timing.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        Self::new(nodes, Vec::new(), Duration::ZERO)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if there were any warnings while building.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// All nodes in display order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Iterate over nodes in display order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Get the node at `index`.
    pub fn get(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// Get the node at `index`, or an error naming the bad index.
    pub fn node(&self, index: usize) -> Result<&TreeNode, LocateError> {
        self.nodes.get(index).ok_or(LocateError::IndexOutOfRange {
            index,
            len: self.nodes.len(),
        })
    }

    /// Iterate over the strict ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = &TreeNode> {
        let mut next = self.get(index).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let node = self.get(next?)?;
            next = node.parent;
            Some(node)
        })
    }

    /// Check if `index` lies inside the subtree of `ancestor`.
    pub fn is_descendant(&self, index: usize, ancestor: usize) -> bool {
        self.ancestors(index).any(|n| n.index == ancestor)
    }

    /// Number of strict ancestors, used for indentation.
    pub fn depth(&self, index: usize) -> usize {
        self.ancestors(index).count()
    }

    /// Indices of the transitive descendants of `index`.
    ///
    /// Relies on subtrees being contiguous: the scan stops at the first
    /// node outside the subtree.
    pub fn subtree_range(&self, index: usize) -> Range<usize> {
        let len = self.nodes.len();
        if index >= len {
            return len..len;
        }
        let start = index + 1;
        let end = (start..len)
            .find(|&n| !self.is_descendant(n, index))
            .unwrap_or(len);
        start..end
    }

    /// File nodes in the subtree of `index`, or the node itself if it is a file.
    pub fn files_under(&self, index: usize) -> Vec<&TreeNode> {
        match self.get(index) {
            Some(node) if node.is_file() => vec![node],
            Some(_) => self.nodes[self.subtree_range(index)]
                .iter()
                .filter(|n| n.is_file())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Distinct consumers of a file, or of every file under a folder.
    pub fn consumers_under(&self, index: usize) -> Vec<&ConsumerId> {
        self.files_under(index)
            .into_iter()
            .flat_map(|n| n.consumers())
            .unique()
            .collect()
    }

    /// Absolute path of a node: the folder path, or parent path plus file name.
    pub fn full_path(&self, index: usize) -> Option<PathBuf> {
        let node = self.get(index)?;
        match &node.kind {
            NodeKind::Folder { path } => Some(path.clone()),
            NodeKind::File { name, .. } => {
                let folder = self.get(node.parent?)?.folder_path()?;
                Some(folder.join(name.as_str()))
            }
        }
    }

    /// Text shown for a node in the tree view.
    ///
    /// Root folders show their full path, nested folders their path
    /// relative to the parent folder, files their name.
    pub fn label(&self, index: usize) -> Option<String> {
        let node = self.get(index)?;
        let label = match (&node.kind, node.parent) {
            (NodeKind::File { name, .. }, _) => name.to_string(),
            (NodeKind::Folder { path }, None) => path.display().to_string(),
            (NodeKind::Folder { path }, Some(parent)) => {
                let base = self.get(parent).and_then(|p| p.folder_path());
                match base.and_then(|base| relative_to(path, base)) {
                    Some(rel) => rel.display().to_string(),
                    None => path.display().to_string(),
                }
            }
        };
        Some(label)
    }

    /// First folder whose path equals `path`.
    pub fn find_folder(&self, path: &Path) -> Option<usize> {
        self.nodes
            .iter()
            .find(|n| n.folder_path() == Some(path))
            .map(|n| n.index)
    }

    /// First file node resolving to the absolute `path`.
    pub fn find_file(&self, path: &Path) -> Option<usize> {
        let folder = self.find_folder(path.parent()?)?;
        let name = path.file_name()?.to_string_lossy();
        self.nodes[self.subtree_range(folder)]
            .iter()
            .find(|n| n.parent == Some(folder) && n.file_name() == Some(&*name))
            .map(|n| n.index)
    }

    /// Visibility of every node, in display order.
    ///
    /// A node is visible when all of its strict ancestors are expanded.
    /// Root nodes are always visible; their own flag only affects children.
    pub fn visibility_mask(&self) -> Vec<bool> {
        let mut mask = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let visible = match node.parent {
                None => true,
                Some(p) => match (mask.get(p), self.nodes.get(p)) {
                    (Some(&parent_visible), Some(parent)) => parent_visible && parent.expanded,
                    _ => self.ancestors(node.index).all(|a| a.expanded),
                },
            };
            mask.push(visible);
        }
        mask
    }

    /// Indices of visible nodes, in display order.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.visibility_mask()
            .into_iter()
            .enumerate()
            .filter_map(|(i, visible)| visible.then_some(i))
            .collect()
    }

    /// Check if a single node is visible.
    pub fn is_visible(&self, index: usize) -> bool {
        index < self.nodes.len() && self.ancestors(index).all(|a| a.expanded)
    }

    /// Set the expansion flag of a node.
    pub fn set_expanded(&mut self, index: usize, expanded: bool) -> Result<(), LocateError> {
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(index)
            .ok_or(LocateError::IndexOutOfRange { index, len })?;
        node.expanded = expanded;
        Ok(())
    }

    /// Flip the expansion flag of a node, returning the new state.
    pub fn toggle_expanded(&mut self, index: usize) -> Result<bool, LocateError> {
        let expanded = !self.node(index)?.expanded;
        self.set_expanded(index, expanded)?;
        Ok(expanded)
    }

    /// Expand every folder.
    pub fn expand_all(&mut self) {
        self.set_all_folders(true);
    }

    /// Collapse every folder.
    pub fn collapse_all(&mut self) {
        self.set_all_folders(false);
    }

    fn set_all_folders(&mut self, expanded: bool) {
        for node in self.nodes.iter_mut().filter(|n| n.is_folder()) {
            node.expanded = expanded;
        }
    }

    /// Index-free description of the tree: kind, own path and parent path
    /// for every node, in order. Two scans of the same references produce
    /// equal shapes.
    pub fn shape(&self) -> Vec<(bool, PathBuf, Option<PathBuf>)> {
        self.nodes
            .iter()
            .map(|n| {
                let parent = n.parent.and_then(|p| self.get(p)).map(|p| p.path().to_path_buf());
                (n.is_folder(), n.path().to_path_buf(), parent)
            })
            .collect()
    }
}

fn ancestor_count(nodes: &[TreeNode], index: usize) -> usize {
    let mut depth = 0;
    let mut next = nodes.get(index).and_then(|n| n.parent);
    while let Some(p) = next {
        depth += 1;
        next = nodes.get(p).and_then(|n| n.parent);
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_tree() -> TextureTree {
        TextureTree::from_nodes(vec![
            TreeNode::new_folder(0, None, "/root/a", true),
            TreeNode::new_file(1, 0, "x.png", vec![ConsumerId::new("c1"), ConsumerId::new("c2")]),
            TreeNode::new_folder(2, Some(0), "/root/a/sub", true),
            TreeNode::new_file(3, 2, "z.png", vec![ConsumerId::new("c1")]),
            TreeNode::new_folder(4, None, "/root/b", true),
            TreeNode::new_file(5, 4, "y.png", vec![ConsumerId::new("c3")]),
        ])
    }

    #[test]
    fn test_tree_stats() {
        let tree = nested_tree();
        assert_eq!(tree.stats.total_folders, 3);
        assert_eq!(tree.stats.total_files, 3);
        assert_eq!(tree.stats.total_consumers, 4);
        assert_eq!(tree.stats.root_folders, 2);
        assert_eq!(tree.stats.max_depth, 1);
    }

    #[test]
    fn test_subtree_range() {
        let tree = nested_tree();
        assert_eq!(tree.subtree_range(0), 1..4);
        assert_eq!(tree.subtree_range(2), 3..4);
        assert_eq!(tree.subtree_range(4), 5..6);
        assert!(tree.subtree_range(5).is_empty());

        assert_eq!(tree.subtree_range(11), 6..6);
        assert!(tree.nodes()[tree.subtree_range(11)].is_empty());
        assert!(tree.files_under(11).is_empty());
    }

    #[test]
    fn test_consumers_under_dedups() {
        let tree = nested_tree();
        let consumers: Vec<&str> = tree.consumers_under(0).iter().map(|c| c.as_str()).collect();
        assert_eq!(consumers, vec!["c1", "c2"]);
        assert_eq!(tree.consumers_under(5).len(), 1);
    }

    #[test]
    fn test_full_path_and_label() {
        let tree = nested_tree();
        assert_eq!(tree.full_path(3), Some(PathBuf::from("/root/a/sub/z.png")));
        assert_eq!(tree.label(0).as_deref(), Some("/root/a"));
        assert_eq!(tree.label(2).as_deref(), Some("sub"));
        assert_eq!(tree.label(3).as_deref(), Some("z.png"));
        assert_eq!(tree.depth(3), 2);
    }

    #[test]
    fn test_find_file() {
        let tree = nested_tree();
        assert_eq!(tree.find_file(Path::new("/root/a/sub/z.png")), Some(3));
        assert_eq!(tree.find_file(Path::new("/root/a/z.png")), None);
    }

    #[test]
    fn test_collapse_hides_descendants() {
        let mut tree = nested_tree();
        tree.set_expanded(0, false).unwrap();

        assert_eq!(tree.visible_indices(), vec![0, 4, 5]);
        assert!(!tree.is_visible(3));
        assert_eq!(tree.get(3).map(|n| n.index), Some(3));

        assert!(tree.toggle_expanded(0).unwrap());
        assert_eq!(tree.visible_indices().len(), 6);
    }

    #[test]
    fn test_collapsed_root_stays_visible() {
        let mut tree = nested_tree();
        tree.collapse_all();
        assert_eq!(tree.visible_indices(), vec![0, 4]);
        tree.expand_all();
        assert!(tree.visibility_mask().iter().all(|&v| v));
    }

    #[test]
    fn test_set_expanded_out_of_range() {
        let mut tree = nested_tree();
        assert!(matches!(
            tree.set_expanded(42, false),
            Err(LocateError::IndexOutOfRange { index: 42, len: 6 })
        ));
    }
}
