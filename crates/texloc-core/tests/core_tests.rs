use std::path::{Path, PathBuf};

use texloc_core::{
    ConsumerId, LocateError, LocatorConfig, NodeKind, PathEncoding, SelectionKey, TextureRef,
    TextureTree, TreeNode, WarningKind,
};

fn consumers(ids: &[&str]) -> Vec<ConsumerId> {
    ids.iter().map(|id| ConsumerId::new(*id)).collect()
}

/// /lib, /lib/wood, /lib/wood/oak, /lib-old, each with one file.
fn library_tree() -> TextureTree {
    TextureTree::from_nodes(vec![
        TreeNode::new_folder(0, None, "/lib", true),
        TreeNode::new_file(1, 0, "base.png", consumers(&["Base"])),
        TreeNode::new_folder(2, Some(0), "/lib/wood", true),
        TreeNode::new_file(3, 2, "pine.png", consumers(&["Pine"])),
        TreeNode::new_folder(4, Some(2), "/lib/wood/oak", true),
        TreeNode::new_file(5, 4, "oak.png", consumers(&["Oak", "Oak.001"])),
        TreeNode::new_folder(6, None, "/lib-old", true),
        TreeNode::new_file(7, 6, "legacy.png", consumers(&["Legacy"])),
    ])
}

#[test]
fn test_node_kind_discrimination() {
    let folder = NodeKind::Folder {
        path: PathBuf::from("/lib"),
    };
    assert!(folder.is_folder());
    assert!(!folder.is_file());

    let file = NodeKind::File {
        name: "a.png".into(),
        consumers: consumers(&["A"]),
    };
    assert!(file.is_file());
    assert!(!file.is_folder());
}

#[test]
fn test_nested_subtrees_are_contiguous() {
    let tree = library_tree();

    assert_eq!(tree.subtree_range(0), 1..6);
    assert_eq!(tree.subtree_range(2), 3..6);
    assert_eq!(tree.subtree_range(4), 5..6);
    assert_eq!(tree.subtree_range(6), 7..8);

    for node in tree.iter() {
        if let Some(parent) = node.parent {
            assert!(parent < node.index);
        }
    }
}

#[test]
fn test_files_under_folder() {
    let tree = library_tree();

    let names: Vec<&str> = tree
        .files_under(2)
        .iter()
        .filter_map(|n| n.file_name())
        .collect();
    assert_eq!(names, vec!["pine.png", "oak.png"]);

    let consumers: Vec<&str> = tree.consumers_under(4).iter().map(|c| c.as_str()).collect();
    assert_eq!(consumers, vec!["Oak", "Oak.001"]);
}

#[test]
fn test_labels_and_depths() {
    let tree = library_tree();

    assert_eq!(tree.label(0).as_deref(), Some("/lib"));
    assert_eq!(tree.label(4).as_deref(), Some("oak"));
    assert_eq!(tree.label(6).as_deref(), Some("/lib-old"));
    assert_eq!(tree.depth(5), 3);
    assert_eq!(tree.full_path(5), Some(PathBuf::from("/lib/wood/oak/oak.png")));
    assert_eq!(tree.label(99), None);
}

#[test]
fn test_visibility_follows_ancestor_chain() {
    let mut tree = library_tree();
    tree.set_expanded(2, false).unwrap();

    let mask = tree.visibility_mask();
    assert_eq!(
        mask,
        vec![true, true, true, false, false, false, true, true]
    );

    // Expanding a hidden folder does not reveal its children while an
    // ancestor stays collapsed.
    tree.set_expanded(4, true).unwrap();
    assert!(!tree.is_visible(5));

    tree.set_expanded(2, true).unwrap();
    assert!(tree.is_visible(5));
}

#[test]
fn test_selection_identity_round_trip() {
    let tree = library_tree();

    for index in 0..tree.len() {
        let key = SelectionKey::capture(&tree, index).unwrap();
        assert_eq!(key.resolve(&tree), Some(index));
    }
}

#[test]
fn test_node_lookup_errors() {
    let tree = library_tree();
    assert!(matches!(
        tree.node(8),
        Err(LocateError::IndexOutOfRange { index: 8, len: 8 })
    ));
    assert!(tree.node(7).is_ok());
}

#[test]
fn test_reference_resolution_through_config() {
    let config = LocatorConfig::new("/projects/shot");
    let encoding: PathEncoding<'_> = config.encoding();

    let path = encoding.resolve("//textures/wood.png").unwrap();
    let reference = TextureRef::new("Wood", path);
    let (dir, name) = reference.split().unwrap();
    assert_eq!(dir, Path::new("/projects/shot/textures"));
    assert_eq!(name, "wood.png");

    assert_eq!(
        TextureRef::new("Broken", "").split().unwrap_err(),
        WarningKind::EmptyPath
    );
}

#[test]
fn test_tree_serializes() {
    let tree = library_tree();
    let json = serde_json::to_string(&tree).unwrap();
    let back: TextureTree = serde_json::from_str(&json).unwrap();
    assert_eq!(back.shape(), tree.shape());
}
