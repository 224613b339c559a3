//! File and folder remapping.

use std::path::Path;

use tracing::{info, warn};

use texloc_core::{
    ConsumerId, LocateError, LocatorConfig, NodeKind, PathEncoding, TextureTree,
};

use crate::operation::{PathChange, RemapMiss};
use crate::report::{RemapKind, RemapReport};
use crate::store::ConsumerStore;

/// Repoints consumers of tree nodes to new files on disk.
#[derive(Debug, Clone, Copy)]
pub struct Remapper<'a> {
    encoding: PathEncoding<'a>,
}

impl<'a> Remapper<'a> {
    /// Create a remapper using the encoding rules of `config`.
    pub fn new(config: &'a LocatorConfig) -> Self {
        Self {
            encoding: config.encoding(),
        }
    }

    /// Point every consumer of the file at `index` to `new_path`.
    ///
    /// Nothing is written unless `new_path` exists and every consumer is
    /// known to the store.
    pub fn change_file<S: ConsumerStore + ?Sized>(
        &self,
        tree: &TextureTree,
        index: usize,
        new_path: &Path,
        store: &mut S,
    ) -> Result<RemapReport, LocateError> {
        let mut report = RemapReport::new(RemapKind::ChangeFile);
        self.change_file_into(tree, index, new_path, store, &mut report)?;
        Ok(report)
    }

    /// Like [`change_file`](Self::change_file), recording into `report`.
    ///
    /// If a store write fails, `report` still lists every write that
    /// happened before it.
    pub fn change_file_into<S: ConsumerStore + ?Sized>(
        &self,
        tree: &TextureTree,
        index: usize,
        new_path: &Path,
        store: &mut S,
        report: &mut RemapReport,
    ) -> Result<(), LocateError> {
        let node = tree.node(index)?;
        let NodeKind::File { consumers, .. } = &node.kind else {
            return Err(LocateError::NotAFile { index });
        };

        if !new_path.exists() {
            warn!(path = %new_path.display(), "replacement file not found");
            return Err(LocateError::NotFound {
                path: new_path.to_path_buf(),
            });
        }
        ensure_known(consumers, &*store)?;

        self.apply(consumers, new_path, store, report)?;

        info!(
            path = %new_path.display(),
            consumers = report.consumers_updated(),
            "changed file"
        );
        Ok(())
    }

    /// Re-root every file under the folder at `index` into `new_dir`.
    ///
    /// Each file keeps its path relative to the folder. Files whose
    /// candidate does not exist are left unchanged and counted as missing;
    /// the rest of the batch still applies.
    pub fn change_folder<S: ConsumerStore + ?Sized>(
        &self,
        tree: &TextureTree,
        index: usize,
        new_dir: &Path,
        store: &mut S,
    ) -> Result<RemapReport, LocateError> {
        let mut report = RemapReport::new(RemapKind::ChangeFolder);
        self.change_folder_into(tree, index, new_dir, store, &mut report)?;
        Ok(report)
    }

    /// Like [`change_folder`](Self::change_folder), recording into `report`.
    ///
    /// If a store write fails, `report` still lists every write that
    /// happened before it.
    pub fn change_folder_into<S: ConsumerStore + ?Sized>(
        &self,
        tree: &TextureTree,
        index: usize,
        new_dir: &Path,
        store: &mut S,
        report: &mut RemapReport,
    ) -> Result<(), LocateError> {
        let node = tree.node(index)?;
        let NodeKind::Folder { path: old_dir } = &node.kind else {
            return Err(LocateError::NotAFolder { index });
        };

        let files = tree.files_under(index);
        for file in &files {
            ensure_known(file.consumers(), &*store)?;
        }

        for file in files {
            let Some(source) = tree.full_path(file.index) else {
                continue;
            };
            let Ok(relative) = source.strip_prefix(old_dir) else {
                continue;
            };
            let candidate = new_dir.join(relative);

            if candidate.exists() {
                self.apply(file.consumers(), &candidate, store, report)?;
            } else {
                warn!(path = %candidate.display(), "can't find remapped file");
                report.record_miss(RemapMiss::new(source, candidate));
            }
        }

        info!(
            from = %old_dir.display(),
            to = %new_dir.display(),
            changed = report.changed,
            missing = report.missing,
            "changed folder"
        );
        Ok(())
    }

    /// Write `new_path` to every consumer, in each consumer's own style.
    ///
    /// Each write is recorded as it lands; the file counts as changed once
    /// all of its consumers are written.
    fn apply<S: ConsumerStore + ?Sized>(
        &self,
        consumers: &[ConsumerId],
        new_path: &Path,
        store: &mut S,
        report: &mut RemapReport,
    ) -> Result<(), LocateError> {
        for consumer in consumers {
            let previous = store.stored_path(consumer).unwrap_or_default();
            let stored = self.encoding.encode_like(&previous, new_path);
            store.set_stored_path(consumer, stored.clone())?;
            report.changes.push(PathChange {
                consumer: consumer.clone(),
                previous,
                stored,
            });
        }
        report.changed += 1;
        Ok(())
    }
}

/// Fail with `UnknownConsumer` unless every consumer has a stored path.
pub(crate) fn ensure_known<'c, S: ConsumerStore + ?Sized>(
    consumers: impl IntoIterator<Item = &'c ConsumerId>,
    store: &S,
) -> Result<(), LocateError> {
    match consumers.into_iter().find(|c| store.stored_path(c).is_none()) {
        Some(consumer) => Err(LocateError::UnknownConsumer {
            consumer: consumer.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use texloc_scan::TextureScanner;

    use crate::store::ReferenceManifest;

    struct Fixture {
        temp: TempDir,
        config: LocatorConfig,
        manifest: ReferenceManifest,
    }

    impl Fixture {
        /// Project with `old/x.png` (used twice, once relative) and
        /// `old/sub/y.png`, plus a `new/` tree holding only `sub/y.png`.
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path();
            fs::create_dir_all(root.join("old/sub")).unwrap();
            fs::create_dir_all(root.join("new/sub")).unwrap();
            fs::write(root.join("old/x.png"), "x").unwrap();
            fs::write(root.join("old/sub/y.png"), "y").unwrap();
            fs::write(root.join("new/sub/y.png"), "y2").unwrap();

            let mut manifest = ReferenceManifest::new();
            manifest.insert("c1", "//old/x.png");
            manifest.insert("c2", root.join("old/x.png").display().to_string());
            manifest.insert("c3", "//old/sub/y.png");

            Self {
                config: LocatorConfig::new(root),
                temp,
                manifest,
            }
        }

        fn tree(&self) -> TextureTree {
            let refs = self.manifest.references(&self.config.encoding());
            TextureScanner::with_config(self.config.clone())
                .scan(&refs, None)
                .tree
        }

        fn root(&self) -> &Path {
            self.temp.path()
        }
    }

    #[test]
    fn test_change_file_updates_all_consumers() {
        let mut fx = Fixture::new();
        let tree = fx.tree();
        let target = fx.root().join("new/sub/y.png");
        let index = tree.find_file(&fx.root().join("old/x.png")).unwrap();

        let report = Remapper::new(&fx.config)
            .change_file(&tree, index, &target, &mut fx.manifest)
            .unwrap();

        assert_eq!(report.changed, 1);
        assert_eq!(report.consumers_updated(), 2);
        assert!(report.rebuild_required());
        assert_eq!(
            fx.manifest.stored_path(&ConsumerId::new("c1")).as_deref(),
            Some("//new/sub/y.png")
        );
        assert_eq!(
            fx.manifest.stored_path(&ConsumerId::new("c2")),
            Some(target.display().to_string())
        );
    }

    #[test]
    fn test_change_file_missing_target_mutates_nothing() {
        let mut fx = Fixture::new();
        let tree = fx.tree();
        let before = fx.manifest.clone();
        let index = tree.find_file(&fx.root().join("old/x.png")).unwrap();

        let err = Remapper::new(&fx.config)
            .change_file(&tree, index, &fx.root().join("nope.png"), &mut fx.manifest)
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(fx.manifest, before);
    }

    #[test]
    fn test_change_file_rejects_folder() {
        let mut fx = Fixture::new();
        let tree = fx.tree();
        let target = fx.root().join("new/sub/y.png");

        let err = Remapper::new(&fx.config)
            .change_file(&tree, 0, &target, &mut fx.manifest)
            .unwrap_err();
        assert!(matches!(err, LocateError::NotAFile { index: 0 }));
    }

    #[test]
    fn test_change_folder_counts_misses() {
        let mut fx = Fixture::new();
        let tree = fx.tree();
        let folder = tree.find_folder(&fx.root().join("old")).unwrap();

        let report = Remapper::new(&fx.config)
            .change_folder(&tree, folder, &fx.root().join("new"), &mut fx.manifest)
            .unwrap();

        assert_eq!(report.changed, 1);
        assert_eq!(report.missing, 1);
        assert_eq!(report.misses[0].candidate, fx.root().join("new/x.png"));
        assert!(report.rebuild_required());

        // x.png had no counterpart and keeps its paths.
        assert_eq!(
            fx.manifest.stored_path(&ConsumerId::new("c1")).as_deref(),
            Some("//old/x.png")
        );
        assert_eq!(
            fx.manifest.stored_path(&ConsumerId::new("c3")).as_deref(),
            Some("//new/sub/y.png")
        );
    }

    #[test]
    fn test_change_folder_all_missing() {
        let mut fx = Fixture::new();
        let tree = fx.tree();
        let before = fx.manifest.clone();
        let folder = tree.find_folder(&fx.root().join("old")).unwrap();

        let report = Remapper::new(&fx.config)
            .change_folder(&tree, folder, &fx.root().join("elsewhere"), &mut fx.manifest)
            .unwrap();

        assert_eq!(report.changed, 0);
        assert_eq!(report.missing, 2);
        assert!(!report.rebuild_required());
        assert_eq!(fx.manifest, before);
    }

    #[test]
    fn test_unknown_consumer_aborts_before_writing() {
        let mut fx = Fixture::new();
        let tree = fx.tree();
        let index = tree.find_file(&fx.root().join("old/x.png")).unwrap();
        fx.manifest.consumers.shift_remove(&ConsumerId::new("c2"));
        let before = fx.manifest.clone();

        let err = Remapper::new(&fx.config)
            .change_file(&tree, index, &fx.root().join("new/sub/y.png"), &mut fx.manifest)
            .unwrap_err();
        assert!(matches!(err, LocateError::UnknownConsumer { .. }));
        assert_eq!(fx.manifest, before);
    }
}
