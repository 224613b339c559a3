//! Texture source remapping engine for texloc.
//!
//! This crate repoints the consumers of a file, or of every file under a
//! folder, to new locations on disk. Replacement paths are checked for
//! existence before anything is written, stored paths keep their
//! project-relative style where possible, and folder remaps count the
//! files they could not find instead of failing.
//!
//! [`LocatorSession`] ties scanning, selection, expansion and remapping
//! together as one context object owned by the host.

mod operation;
mod remap;
mod report;
mod session;
mod store;
mod undo;

pub use operation::{PathChange, RemapMiss, RemapOperation};
pub use remap::Remapper;
pub use report::{RemapKind, RemapReport};
pub use session::LocatorSession;
pub use store::{ConsumerStore, ReferenceManifest};
pub use undo::{UndoEntry, UndoLog};

// Re-export core types for convenience
pub use texloc_core::{ConsumerId, LocateError, LocatorConfig, TextureRef, TextureTree};
