//! The locator session: one tree, one selection, owned by the host.

use std::path::Path;

use tracing::{debug, info, warn};

use texloc_core::{
    ConsumerId, LocateError, LocatorConfig, SelectionKey, TextureRef, TextureTree, TreeNode,
};
use texloc_scan::{PreviewRefresh, TextureScanner};

use crate::operation::RemapOperation;
use crate::operation::PathChange;
use crate::remap::{Remapper, ensure_known};
use crate::report::{RemapKind, RemapReport};
use crate::store::ConsumerStore;
use crate::undo::UndoLog;

/// Scan and remap state for one locator view.
///
/// The host owns the session and passes it (with its consumer store) into
/// every operation. The tree is only ever replaced by a rescan; the one
/// in-place change allowed is toggling folder expansion.
#[derive(Debug)]
pub struct LocatorSession {
    config: LocatorConfig,
    tree: TextureTree,
    selected: Option<usize>,
    source: Option<String>,
    rebuild_required: bool,
    undo: UndoLog,
}

impl Default for LocatorSession {
    fn default() -> Self {
        Self::new(LocatorConfig::default())
    }
}

impl LocatorSession {
    /// Create an empty session.
    pub fn new(config: LocatorConfig) -> Self {
        let undo = UndoLog::new(config.undo_depth);
        Self {
            config,
            tree: TextureTree::default(),
            selected: None,
            source: None,
            rebuild_required: false,
            undo,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// The current tree.
    pub fn tree(&self) -> &TextureTree {
        &self.tree
    }

    /// Index of the selected node.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// The selected node.
    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selected.and_then(|i| self.tree.get(i))
    }

    /// Select a node, or clear the selection with `None`.
    pub fn select(&mut self, index: Option<usize>) -> Result<(), LocateError> {
        if let Some(index) = index {
            self.tree.node(index)?;
        }
        self.selected = index;
        Ok(())
    }

    /// Path identity of the selection, for carrying it across a rebuild.
    pub fn selection_key(&self) -> Option<SelectionKey> {
        SelectionKey::capture(&self.tree, self.selected?)
    }

    /// Check if the tree is stale since the last remap.
    pub fn rebuild_required(&self) -> bool {
        self.rebuild_required
    }

    /// Check if a rescan is due for `source` (e.g. the active material).
    ///
    /// True when the source differs from the one last scanned or a remap
    /// left the tree stale. The host decides whether to act on it.
    pub fn needs_rescan(&self, source: &str) -> bool {
        self.rebuild_required || self.source.as_deref() != Some(source)
    }

    /// Rebuild the tree from the consumers in `store`.
    pub fn rescan<S: ConsumerStore + ?Sized>(&mut self, store: &S) -> Vec<PreviewRefresh> {
        let refs = store.references(&self.config.encoding());
        self.rescan_refs(&refs)
    }

    /// Rebuild the tree for a named source and remember it.
    pub fn rescan_source<S: ConsumerStore + ?Sized>(
        &mut self,
        source: impl Into<String>,
        store: &S,
    ) -> Vec<PreviewRefresh> {
        self.source = Some(source.into());
        self.rescan(store)
    }

    /// Rebuild the tree from already resolved references.
    ///
    /// The selection is carried over by path and collapsed folders stay
    /// collapsed.
    pub fn rescan_refs(&mut self, refs: &[TextureRef]) -> Vec<PreviewRefresh> {
        let key = self.selection_key();
        let scanner = TextureScanner::with_config(self.config.clone());
        let outcome = scanner.rescan(&self.tree, refs, key.as_ref());

        self.tree = outcome.tree;
        self.selected = outcome.selected;
        self.rebuild_required = false;
        outcome.previews
    }

    /// Drop the tree and selection.
    pub fn clear(&mut self) {
        self.tree = TextureTree::default();
        self.selected = None;
        self.source = None;
        self.rebuild_required = false;
    }

    /// Visibility of every node under the current expansion flags.
    pub fn visibility_mask(&self) -> Vec<bool> {
        self.tree.visibility_mask()
    }

    /// Set a folder's expansion flag.
    pub fn set_expanded(&mut self, index: usize, expanded: bool) -> Result<(), LocateError> {
        self.tree.set_expanded(index, expanded)
    }

    /// Flip a folder's expansion flag.
    pub fn toggle_expanded(&mut self, index: usize) -> Result<bool, LocateError> {
        self.tree.toggle_expanded(index)
    }

    /// Consumers of the selected file, or of every file under the selected folder.
    pub fn selected_consumers(&self) -> Result<Vec<&ConsumerId>, LocateError> {
        let index = self.selected.ok_or(LocateError::EmptySelection)?;
        Ok(self.tree.consumers_under(index))
    }

    /// Point the selected file's consumers at `new_path`.
    pub fn change_file<S: ConsumerStore + ?Sized>(
        &mut self,
        store: &mut S,
        new_path: &Path,
    ) -> Result<RemapReport, LocateError> {
        let index = self.selected.ok_or(LocateError::EmptySelection)?;
        let mut report = RemapReport::new(RemapKind::ChangeFile);
        let result = Remapper::new(&self.config).change_file_into(
            &self.tree,
            index,
            new_path,
            store,
            &mut report,
        );
        self.finish(report, result)
    }

    /// Re-root every file under the selected folder into `new_dir`.
    pub fn change_folder<S: ConsumerStore + ?Sized>(
        &mut self,
        store: &mut S,
        new_dir: &Path,
    ) -> Result<RemapReport, LocateError> {
        let index = self.selected.ok_or(LocateError::EmptySelection)?;
        let mut report = RemapReport::new(RemapKind::ChangeFolder);
        let result = Remapper::new(&self.config).change_folder_into(
            &self.tree,
            index,
            new_dir,
            store,
            &mut report,
        );
        self.finish(report, result)
    }

    /// Apply a remap operation to the selection.
    pub fn execute<S: ConsumerStore + ?Sized>(
        &mut self,
        store: &mut S,
        operation: &RemapOperation,
    ) -> Result<RemapReport, LocateError> {
        match operation {
            RemapOperation::ChangeFile { target } => self.change_file(store, target),
            RemapOperation::ChangeFolder { target } => self.change_folder(store, target),
        }
    }

    /// Restore the stored paths written by the most recent remap.
    ///
    /// Returns `None` if there is nothing to undo. Every consumer is checked
    /// before anything is written. If a write still fails, the entry stays
    /// in the log and the tree is marked stale when something was written.
    pub fn undo_last<S: ConsumerStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<Option<RemapReport>, LocateError> {
        let Some(entry) = self.undo.peek() else {
            return Ok(None);
        };
        ensure_known(entry.changes.iter().map(|c| &c.consumer), &*store)?;
        let Some(entry) = self.undo.pop() else {
            return Ok(None);
        };

        let reverted: Vec<PathChange> = entry.reverted().collect();
        let mut report = RemapReport::new(RemapKind::Undo);
        for change in reverted {
            if let Err(err) = store.set_stored_path(&change.consumer, change.stored.clone()) {
                warn!(
                    entry = entry.id,
                    written = report.consumers_updated(),
                    "undo interrupted"
                );
                self.rebuild_required |= report.rebuild_required();
                self.undo.reinstate(entry);
                return Err(err);
            }
            report.changes.push(change);
        }
        report.changed = 1;

        info!(entry = entry.id, consumers = report.consumers_updated(), "undid remap");
        self.rebuild_required = true;
        Ok(Some(report))
    }

    /// Number of remap batches that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Record whatever was written, then hand back the report or the error.
    fn finish(
        &mut self,
        report: RemapReport,
        result: Result<(), LocateError>,
    ) -> Result<RemapReport, LocateError> {
        if report.rebuild_required() {
            self.undo.record(&report);
            self.rebuild_required = true;
        }
        match result {
            Ok(()) => {
                debug!(
                    kind = %report.kind,
                    changed = report.changed,
                    missing = report.missing,
                    "remap finished"
                );
                Ok(report)
            }
            Err(err) => {
                if report.rebuild_required() {
                    warn!(
                        kind = %report.kind,
                        written = report.consumers_updated(),
                        "remap interrupted after partial write"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ReferenceManifest;

    fn manifest() -> ReferenceManifest {
        let mut manifest = ReferenceManifest::new();
        manifest.insert("c1", "/root/a/x.png");
        manifest.insert("c2", "/root/a/x.png");
        manifest.insert("c3", "/root/b/y.png");
        manifest
    }

    #[test]
    fn test_actions_need_a_selection() {
        let mut store = manifest();
        let mut session = LocatorSession::default();
        session.rescan(&store);

        let err = session
            .change_file(&mut store, Path::new("/root/a/x.png"))
            .unwrap_err();
        assert!(matches!(err, LocateError::EmptySelection));
        assert!(matches!(
            session.selected_consumers(),
            Err(LocateError::EmptySelection)
        ));
    }

    #[test]
    fn test_select_validates_index() {
        let store = manifest();
        let mut session = LocatorSession::default();
        session.rescan(&store);

        assert!(session.select(Some(3)).is_ok());
        assert!(session.select(Some(4)).is_err());
        assert_eq!(session.selected(), Some(3));
        assert!(session.select(None).is_ok());
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_needs_rescan_tracks_source() {
        let store = manifest();
        let mut session = LocatorSession::default();
        assert!(session.needs_rescan("Material"));

        session.rescan_source("Material", &store);
        assert!(!session.needs_rescan("Material"));
        assert!(session.needs_rescan("Material.001"));

        session.clear();
        assert!(session.tree().is_empty());
        assert!(session.needs_rescan("Material"));
    }

    #[test]
    fn test_selected_consumers() {
        let store = manifest();
        let mut session = LocatorSession::default();
        session.rescan(&store);
        session.select(Some(0)).unwrap();

        let consumers: Vec<&str> = session
            .selected_consumers()
            .unwrap()
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(consumers, vec!["c1", "c2"]);
    }
}
