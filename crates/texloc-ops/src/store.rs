//! Consumer stores: where texture consumers keep their source paths.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use texloc_core::{ConsumerId, LocateError, PathEncoding, TextureRef};

/// Host-side storage of consumer source paths.
///
/// Stored paths are kept exactly as the host writes them, which may be the
/// project-relative form. Remaps read them to learn the encoding style and
/// write back re-encoded paths.
pub trait ConsumerStore {
    /// Stored source path of `consumer`, if the consumer exists.
    fn stored_path(&self, consumer: &ConsumerId) -> Option<String>;

    /// Replace the stored source path of `consumer`.
    fn set_stored_path(&mut self, consumer: &ConsumerId, stored: String)
    -> Result<(), LocateError>;

    /// Every consumer with its resolved absolute path, in host order.
    ///
    /// Consumers without a stored path are reported with an empty path so
    /// the scan can record them as skipped.
    fn references(&self, encoding: &PathEncoding<'_>) -> Vec<TextureRef>;
}

/// A serializable consumer store backed by a JSON manifest.
///
/// ```json
/// {
///   "project_root": "/projects/shot",
///   "consumers": { "Wood": "//textures/wood.png" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceManifest {
    /// Directory project-relative paths are resolved against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,

    /// Stored source path per consumer, in host order.
    #[serde(default)]
    pub consumers: IndexMap<ConsumerId, String>,
}

impl ReferenceManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a consumer.
    pub fn insert(&mut self, consumer: impl Into<ConsumerId>, stored: impl Into<String>) {
        self.consumers.insert(consumer.into(), stored.into());
    }

    /// Parse a manifest from JSON text.
    pub fn from_json(path: &Path, json: &str) -> Result<Self, LocateError> {
        serde_json::from_str(json).map_err(|e| LocateError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Serialize the manifest as pretty JSON.
    pub fn to_json(&self, path: &Path) -> Result<String, LocateError> {
        serde_json::to_string_pretty(self).map_err(|e| LocateError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a manifest file.
    pub fn load(path: &Path) -> Result<Self, LocateError> {
        let json = std::fs::read_to_string(path).map_err(|e| LocateError::io(path, e))?;
        Self::from_json(path, &json)
    }

    /// Write the manifest back to a file.
    pub fn save(&self, path: &Path) -> Result<(), LocateError> {
        let json = self.to_json(path)?;
        std::fs::write(path, json).map_err(|e| LocateError::io(path, e))
    }

    /// Number of consumers.
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    /// Check if the manifest has no consumers.
    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}

impl ConsumerStore for ReferenceManifest {
    fn stored_path(&self, consumer: &ConsumerId) -> Option<String> {
        self.consumers.get(consumer).cloned()
    }

    fn set_stored_path(
        &mut self,
        consumer: &ConsumerId,
        stored: String,
    ) -> Result<(), LocateError> {
        match self.consumers.get_mut(consumer) {
            Some(slot) => {
                *slot = stored;
                Ok(())
            }
            None => Err(LocateError::UnknownConsumer {
                consumer: consumer.clone(),
            }),
        }
    }

    fn references(&self, encoding: &PathEncoding<'_>) -> Vec<TextureRef> {
        self.consumers
            .iter()
            .map(|(consumer, stored)| {
                let path = encoding.resolve(stored).unwrap_or_default();
                TextureRef::new(consumer.clone(), path)
            })
            .collect()
    }
}
