//! Undo log for remap batches.

use std::collections::VecDeque;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::operation::PathChange;
use crate::report::{RemapKind, RemapReport};

/// An entry in the undo log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoEntry {
    /// Unique ID for this entry.
    pub id: u64,
    /// When the remap was applied.
    pub timestamp: SystemTime,
    /// The kind of remap.
    pub kind: RemapKind,
    /// Stored paths written by the remap, in application order.
    pub changes: Vec<PathChange>,
    /// Human-readable description.
    pub description: String,
}

impl UndoEntry {
    /// Stored paths to write back, last change first.
    pub fn reverted(&self) -> impl Iterator<Item = PathChange> + '_ {
        self.changes.iter().rev().map(|c| PathChange {
            consumer: c.consumer.clone(),
            previous: c.stored.clone(),
            stored: c.previous.clone(),
        })
    }
}

/// Undo log with configurable maximum depth.
#[derive(Debug)]
pub struct UndoLog {
    entries: VecDeque<UndoEntry>,
    max_entries: usize,
    next_id: u64,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl UndoLog {
    /// Create a new undo log with the specified maximum entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1000)),
            max_entries,
            next_id: 0,
        }
    }

    /// Record the stored paths written by a remap.
    ///
    /// Reports that changed nothing are not recorded. Returns the ID
    /// assigned to the entry.
    pub fn record(&mut self, report: &RemapReport) -> Option<u64> {
        if report.changes.is_empty() || self.max_entries == 0 {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        // Remove oldest entry if at capacity
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }

        let description = format!(
            "{}: {} files, {} consumers",
            report.kind,
            report.changed,
            report.consumers_updated()
        );
        self.entries.push_back(UndoEntry {
            id,
            timestamp: SystemTime::now(),
            kind: report.kind,
            changes: report.changes.clone(),
            description,
        });

        Some(id)
    }

    /// Pop the most recent entry.
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    /// Put a popped entry back as the most recent one.
    pub fn reinstate(&mut self, entry: UndoEntry) {
        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Peek at the most recent entry without removing it.
    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.back()
    }

    /// Get the number of entries in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries from the log.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get an iterator over all entries (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &UndoEntry> {
        self.entries.iter()
    }
}
