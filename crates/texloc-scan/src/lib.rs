//! Texture reference indexing and tree building for texloc.
//!
//! This crate turns a flat list of texture references into the ordered
//! folder/file tree the locator displays.
//!
//! # Overview
//!
//! - [`PathIndex`] groups references by directory, deduplicating files by
//!   name and collecting every consumer of each file.
//! - [`TreeBuilder`] flattens the index into display order: directories
//!   sorted so ancestors come first, each folder followed by its files.
//! - [`TextureScanner`] runs both and carries the previous selection over
//!   to the new tree.
//!
//! # Example
//!
//! ```rust
//! use texloc_scan::{TextureRef, TextureScanner};
//!
//! let refs = vec![
//!     TextureRef::new("Wood", "/textures/wood.png"),
//!     TextureRef::new("Wood.001", "/textures/wood.png"),
//! ];
//!
//! let outcome = TextureScanner::new().scan(&refs, None);
//! assert_eq!(outcome.tree.len(), 2);
//! assert_eq!(outcome.tree.stats.total_consumers, 2);
//! ```

mod builder;
mod index;
mod scanner;

pub use builder::{BuiltTree, PreviewRefresh, TreeBuilder};
pub use index::{DirBucket, PathIndex};
pub use scanner::{ScanOutcome, TextureScanner};

// Re-export core types for convenience
pub use texloc_core::{
    ConsumerId, LocatorConfig, NodeKind, ScanWarning, SelectionKey, TextureRef, TextureTree,
    TreeNode, TreeStats, WarningKind,
};
