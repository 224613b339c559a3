//! Directory index of texture references.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use indexmap::IndexMap;
use tracing::debug;

use texloc_core::{ConsumerId, ScanWarning, TextureRef, WarningKind};

/// Distinct files of one directory, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DirBucket {
    files: IndexMap<CompactString, Vec<ConsumerId>>,
}

impl DirBucket {
    /// Add `consumer` to the file called `name`, creating the entry if needed.
    ///
    /// A consumer already listed for the file is not added twice.
    pub fn insert(&mut self, name: CompactString, consumer: ConsumerId) {
        let consumers = self.files.entry(name).or_default();
        if !consumers.contains(&consumer) {
            consumers.push(consumer);
        }
    }

    /// Iterate over `(file name, consumers)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ConsumerId])> {
        self.files.iter().map(|(name, c)| (name.as_str(), c.as_slice()))
    }

    /// Number of distinct files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the bucket has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (CompactString, Vec<ConsumerId>)> {
        self.files.into_iter()
    }
}

/// References grouped by absolute parent directory.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    dirs: IndexMap<PathBuf, DirBucket>,
    warnings: Vec<ScanWarning>,
}

impl PathIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every reference in order.
    pub fn build<'a>(refs: impl IntoIterator<Item = &'a TextureRef>) -> Self {
        let mut index = Self::new();
        for reference in refs {
            index.add(reference);
        }
        index
    }

    /// Add one reference.
    ///
    /// References whose path does not split into a directory and a file
    /// name are skipped and recorded as warnings. Returns whether the
    /// reference was indexed.
    pub fn add(&mut self, reference: &TextureRef) -> bool {
        match reference.split() {
            Ok((dir, name)) => {
                self.dirs
                    .entry(dir.to_path_buf())
                    .or_default()
                    .insert(name, reference.consumer.clone());
                true
            }
            Err(kind) => {
                debug!(
                    consumer = %reference.consumer,
                    path = %reference.path.display(),
                    ?kind,
                    "skipping texture reference"
                );
                let warning = match kind {
                    WarningKind::EmptyPath => ScanWarning::empty_path(reference.consumer.clone()),
                    kind => ScanWarning::unsplittable(
                        &reference.path,
                        reference.consumer.clone(),
                        kind,
                    ),
                };
                self.warnings.push(warning);
                false
            }
        }
    }

    /// Files of one directory.
    pub fn bucket(&self, dir: &Path) -> Option<&DirBucket> {
        self.dirs.get(dir)
    }

    /// Directories in first-seen order.
    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.dirs.keys().map(PathBuf::as_path)
    }

    /// Number of distinct directories.
    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    /// Number of distinct files across all directories.
    pub fn file_count(&self) -> usize {
        self.dirs.values().map(DirBucket::len).sum()
    }

    /// Warnings for skipped references.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    pub(crate) fn into_parts(self) -> (IndexMap<PathBuf, DirBucket>, Vec<ScanWarning>) {
        (self.dirs, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_directory() {
        let refs = vec![
            TextureRef::new("c1", "/root/a/x.png"),
            TextureRef::new("c2", "/root/b/y.png"),
            TextureRef::new("c3", "/root/a/w.png"),
        ];
        let index = PathIndex::build(&refs);

        assert_eq!(index.dir_count(), 2);
        assert_eq!(index.file_count(), 3);
        let dirs: Vec<&Path> = index.directories().collect();
        assert_eq!(dirs, vec![Path::new("/root/a"), Path::new("/root/b")]);
    }

    #[test]
    fn test_dedups_files_and_consumers() {
        let refs = vec![
            TextureRef::new("c1", "/root/a/x.png"),
            TextureRef::new("c2", "/root/a/x.png"),
            TextureRef::new("c1", "/root/a/x.png"),
        ];
        let index = PathIndex::build(&refs);

        let bucket = index.bucket(Path::new("/root/a")).unwrap();
        assert_eq!(bucket.len(), 1);
        let (name, consumers) = bucket.iter().next().unwrap();
        assert_eq!(name, "x.png");
        assert_eq!(consumers, &[ConsumerId::new("c1"), ConsumerId::new("c2")]);
    }

    #[test]
    fn test_bucket_keeps_first_seen_order() {
        let refs = vec![
            TextureRef::new("c1", "/t/zebra.png"),
            TextureRef::new("c2", "/t/apple.png"),
            TextureRef::new("c3", "/t/zebra.png"),
            TextureRef::new("c4", "/t/mango.png"),
        ];
        let index = PathIndex::build(&refs);

        let names: Vec<&str> = index
            .bucket(Path::new("/t"))
            .unwrap()
            .iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["zebra.png", "apple.png", "mango.png"]);
    }

    #[test]
    fn test_skips_unplaceable_references() {
        let refs = vec![
            TextureRef::new("empty", ""),
            TextureRef::new("bare", "x.png"),
            TextureRef::new("ok", "/t/x.png"),
        ];
        let index = PathIndex::build(&refs);

        assert_eq!(index.file_count(), 1);
        assert_eq!(index.warnings().len(), 2);
        assert_eq!(index.warnings()[0].kind, WarningKind::EmptyPath);
        assert_eq!(index.warnings()[1].kind, WarningKind::NoDirectory);
    }

    #[cfg(unix)]
    #[test]
    fn test_skips_non_utf8_file_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = Path::new("/t");
        let refs = vec![
            TextureRef::new("a", dir.join(OsStr::from_bytes(b"a\xff.png"))),
            TextureRef::new("b", dir.join(OsStr::from_bytes(b"a\xfe.png"))),
            TextureRef::new("ok", "/t/x.png"),
        ];
        let index = PathIndex::build(&refs);

        assert_eq!(index.file_count(), 1);
        assert_eq!(index.warnings().len(), 2);
        assert!(index
            .warnings()
            .iter()
            .all(|w| w.kind == WarningKind::NonUtf8Name));
    }
}
