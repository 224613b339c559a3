//! Texture references supplied by the host.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::WarningKind;
use crate::node::ConsumerId;

/// A consumer together with the absolute file path it currently resolves to.
///
/// This is the whole input contract of a scan: the scanner never looks at
/// the consumer beyond its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    /// Consumer holding the reference.
    pub consumer: ConsumerId,
    /// Absolute path the consumer resolves to.
    pub path: PathBuf,
}

impl TextureRef {
    /// Create a new texture reference.
    pub fn new(consumer: impl Into<ConsumerId>, path: impl Into<PathBuf>) -> Self {
        Self {
            consumer: consumer.into(),
            path: path.into(),
        }
    }

    /// Split the path into `(directory, file name)`.
    ///
    /// A trailing separator means the path names a directory, which has no
    /// file name here. File names must be UTF-8; the directory part may
    /// be anything the platform accepts.
    pub fn split(&self) -> Result<(&Path, CompactString), WarningKind> {
        if self.path.as_os_str().is_empty() {
            return Err(WarningKind::EmptyPath);
        }

        let raw = self.path.as_os_str().to_string_lossy();
        if raw.ends_with(std::path::is_separator) {
            return Err(WarningKind::NoFileName);
        }

        let name = self.path.file_name().ok_or(WarningKind::NoFileName)?;
        let name = CompactString::from(name.to_str().ok_or(WarningKind::NonUtf8Name)?);

        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => Ok((dir, name)),
            _ => Err(WarningKind::NoDirectory),
        }
    }
}
