//! Remap operation types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use texloc_core::ConsumerId;

/// A remap to apply to the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemapOperation {
    /// Point every consumer of the selected file at another file.
    ChangeFile { target: PathBuf },
    /// Re-root every file under the selected folder into another directory.
    ChangeFolder { target: PathBuf },
}

impl RemapOperation {
    /// Create a file remap.
    pub fn change_file(target: impl Into<PathBuf>) -> Self {
        Self::ChangeFile {
            target: target.into(),
        }
    }

    /// Create a folder remap.
    pub fn change_folder(target: impl Into<PathBuf>) -> Self {
        Self::ChangeFolder {
            target: target.into(),
        }
    }

    /// The replacement file or directory.
    pub fn target(&self) -> &PathBuf {
        match self {
            Self::ChangeFile { target } | Self::ChangeFolder { target } => target,
        }
    }
}

/// A folder remap candidate that did not exist and was left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapMiss {
    /// Current absolute path of the file.
    pub source: PathBuf,
    /// Candidate that was looked for.
    pub candidate: PathBuf,
}

impl RemapMiss {
    /// Create a new miss.
    pub fn new(source: PathBuf, candidate: PathBuf) -> Self {
        Self { source, candidate }
    }
}

impl std::fmt::Display for RemapMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: can't find {}",
            self.source.display(),
            self.candidate.display()
        )
    }
}

/// One stored path rewritten by a remap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChange {
    /// Consumer whose stored path changed.
    pub consumer: ConsumerId,
    /// Stored path before the remap.
    pub previous: String,
    /// Stored path after the remap.
    pub stored: String,
}
