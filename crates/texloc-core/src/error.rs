//! Error and warning types for scanning and remapping.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::ConsumerId;

/// Errors that can occur while scanning or remapping texture paths.
#[derive(Debug, Error)]
pub enum LocateError {
    /// A replacement path does not exist on disk.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// An action needed a selected node but nothing is selected.
    #[error("Nothing is selected")]
    EmptySelection,

    /// A node index does not exist in the current tree.
    #[error("Node index {index} out of range (tree has {len} nodes)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A file action was invoked on a folder node.
    #[error("Node {index} is not a file")]
    NotAFile { index: usize },

    /// A folder action was invoked on a file node.
    #[error("Node {index} is not a folder")]
    NotAFolder { index: usize },

    /// The consumer store has no entry for a consumer.
    #[error("Unknown consumer: {consumer}")]
    UnknownConsumer { consumer: ConsumerId },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A reference manifest could not be parsed or written.
    #[error("Invalid manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LocateError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Check if this error means a candidate path was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// The reference has no stored path at all.
    EmptyPath,
    /// The resolved path has no parent directory.
    NoDirectory,
    /// The resolved path has no file name component.
    NoFileName,
    /// The file name is not valid UTF-8.
    NonUtf8Name,
}

/// Non-fatal warning encountered during a scan.
///
/// References that cannot be placed in the tree are skipped, never
/// reported as errors. Warnings only make the skip visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path that was skipped.
    pub path: PathBuf,
    /// Consumer the skipped reference belonged to.
    pub consumer: ConsumerId,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(
        path: impl Into<PathBuf>,
        consumer: ConsumerId,
        message: impl Into<String>,
        kind: WarningKind,
    ) -> Self {
        Self {
            path: path.into(),
            consumer,
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a reference with an empty path.
    pub fn empty_path(consumer: ConsumerId) -> Self {
        Self {
            message: format!("{consumer} has no source path"),
            path: PathBuf::new(),
            consumer,
            kind: WarningKind::EmptyPath,
        }
    }

    /// Create a warning for a path that does not split into directory and name.
    pub fn unsplittable(path: impl Into<PathBuf>, consumer: ConsumerId, kind: WarningKind) -> Self {
        let path = path.into();
        let message = match kind {
            WarningKind::NoFileName => format!("{} has no file name", path.display()),
            WarningKind::NonUtf8Name => format!("{} has a non UTF-8 file name", path.display()),
            _ => format!("{} has no directory", path.display()),
        };
        Self {
            message,
            path,
            consumer,
            kind,
        }
    }
}
