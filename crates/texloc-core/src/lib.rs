//! Core types and traits for texloc.
//!
//! This crate provides the fundamental data structures shared by the
//! scanning and remapping crates: texture references, tree nodes, the
//! ordered texture tree, selection identities, path encoding and
//! configuration.

mod config;
mod encoding;
mod error;
mod node;
mod reference;
mod selection;
mod tree;

pub use config::{LocatorConfig, LocatorConfigBuilder};
pub use encoding::{PathEncoding, relative_to};
pub use error::{LocateError, ScanWarning, WarningKind};
pub use node::{ConsumerId, NodeKind, TreeNode};
pub use reference::TextureRef;
pub use selection::SelectionKey;
pub use tree::{TextureTree, TreeStats};
