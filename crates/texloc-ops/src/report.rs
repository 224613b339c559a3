//! Remap result reporting.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::operation::{PathChange, RemapMiss};

/// The kind of remap performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum RemapKind {
    #[strum(to_string = "Change file")]
    ChangeFile,
    #[strum(to_string = "Change folder")]
    ChangeFolder,
    Undo,
}

/// Outcome of a remap batch.
///
/// Misses are never errors: each one is counted and listed here while the
/// rest of the batch is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapReport {
    /// The kind of remap.
    pub kind: RemapKind,
    /// Number of files whose consumers were repointed.
    pub changed: usize,
    /// Number of candidate files that did not exist.
    pub missing: usize,
    /// Candidates that did not exist, in tree order.
    pub misses: Vec<RemapMiss>,
    /// Every stored path written, in application order.
    pub changes: Vec<PathChange>,
}

impl RemapReport {
    /// Create an empty report.
    pub fn new(kind: RemapKind) -> Self {
        Self {
            kind,
            changed: 0,
            missing: 0,
            misses: Vec::new(),
            changes: Vec::new(),
        }
    }

    /// Record a file that was repointed.
    pub fn record_changed(&mut self, changes: impl IntoIterator<Item = PathChange>) {
        self.changed += 1;
        self.changes.extend(changes);
    }

    /// Record a candidate that was not found.
    pub fn record_miss(&mut self, miss: RemapMiss) {
        self.missing += 1;
        self.misses.push(miss);
    }

    /// Number of consumers whose stored path was rewritten.
    pub fn consumers_updated(&self) -> usize {
        self.changes.len()
    }

    /// Check if any candidate was missing.
    pub fn has_misses(&self) -> bool {
        self.missing > 0
    }

    /// Check if the tree is stale after this remap.
    ///
    /// True as soon as any stored path was written, even if the batch
    /// stopped partway.
    pub fn rebuild_required(&self) -> bool {
        !self.changes.is_empty()
    }
}
