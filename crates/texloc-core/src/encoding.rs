//! Stored path encoding.
//!
//! Hosts store texture sources either as absolute paths or as paths
//! relative to the project file, marked with a prefix (`//` by default).
//! Scans need the absolute form; remaps write back in whichever form the
//! consumer used before.

use std::path::{Component, Path, PathBuf};

/// Encoding rules for stored texture paths.
#[derive(Debug, Clone, Copy)]
pub struct PathEncoding<'a> {
    project_root: Option<&'a Path>,
    prefix: &'a str,
}

impl<'a> PathEncoding<'a> {
    /// Create encoding rules for a project root and relative prefix.
    pub fn new(project_root: Option<&'a Path>, prefix: &'a str) -> Self {
        Self {
            project_root,
            prefix,
        }
    }

    /// Check if a stored path uses the project-relative form.
    pub fn is_relative(&self, stored: &str) -> bool {
        !self.prefix.is_empty() && stored.starts_with(self.prefix)
    }

    /// Resolve a stored path to an absolute, lexically normalized path.
    ///
    /// Returns `None` for an empty stored path. A project-relative path
    /// without a configured project root resolves against nothing and is
    /// returned without its prefix. A trailing separator survives
    /// normalization so a stored directory never reads as a file.
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        if stored.is_empty() {
            return None;
        }

        let path = match stored.strip_prefix(self.prefix).filter(|_| !self.prefix.is_empty()) {
            Some(rest) => match self.project_root {
                Some(root) => root.join(rest),
                None => PathBuf::from(rest),
            },
            None => PathBuf::from(stored),
        };

        let mut resolved = normalize(&path);
        if ends_with_separator(stored) && !ends_with_separator(&resolved.to_string_lossy()) {
            let mut raw = resolved.into_os_string();
            raw.push(std::path::MAIN_SEPARATOR_STR);
            resolved = PathBuf::from(raw);
        }
        Some(resolved)
    }

    /// Encode `new_path` in the same style as `previous`.
    ///
    /// Falls back to the absolute form when `previous` was absolute, when
    /// no project root is configured, or when `new_path` cannot be reached
    /// from the project root (e.g. it lives on another volume).
    pub fn encode_like(&self, previous: &str, new_path: &Path) -> String {
        if self.is_relative(previous) {
            if let Some(rel) = self.project_root.and_then(|root| relative_to(new_path, root)) {
                return format!("{}{}", self.prefix, rel.display());
            }
        }
        new_path.to_string_lossy().into_owned()
    }
}

fn ends_with_separator(text: &str) -> bool {
    text.ends_with(std::path::is_separator)
}

/// Compute `path` relative to `base`, both absolute.
///
/// Returns `None` when either path is relative or the two do not share a
/// root (different drive or UNC share).
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    if !path.is_absolute() || !base.is_absolute() {
        return None;
    }

    let path = normalize(path);
    let base = normalize(base);
    let ours: Vec<Component<'_>> = path.components().collect();
    let theirs: Vec<Component<'_>> = base.components().collect();

    let common = ours
        .iter()
        .zip(&theirs)
        .take_while(|(a, b)| a == b)
        .count();

    let rooted = |c: &Component<'_>| matches!(c, Component::Prefix(_) | Component::RootDir);
    if ours[common..].iter().any(rooted) || theirs[common..].iter().any(rooted) {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in common..theirs.len() {
        rel.push("..");
    }
    for component in &ours[common..] {
        rel.push(component.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// Lexically normalize a path, dropping `.` and folding `..`.
///
/// `..` never climbs above the root of an absolute path.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}
