//! Locator configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::encoding::PathEncoding;
use crate::error::LocateError;

/// Configuration for scanning and remapping.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct LocatorConfig {
    /// Directory project-relative paths are resolved against.
    #[builder(default)]
    #[serde(default)]
    pub project_root: Option<PathBuf>,

    /// Prefix marking a stored path as project-relative.
    #[builder(default = "default_relative_prefix()")]
    #[serde(default = "default_relative_prefix")]
    pub relative_prefix: String,

    /// Initial expansion state of newly built folders.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub expand_new_folders: bool,

    /// Maximum number of remap batches kept for undo.
    #[builder(default = "100")]
    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,
}

fn default_relative_prefix() -> String {
    "//".to_string()
}

fn default_true() -> bool {
    true
}

fn default_undo_depth() -> usize {
    100
}

impl LocatorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        check(
            self.relative_prefix.as_deref(),
            self.project_root.as_ref().and_then(|r| r.as_deref()),
        )
    }
}

fn check(prefix: Option<&str>, root: Option<&Path>) -> Result<(), String> {
    if prefix.is_some_and(str::is_empty) {
        return Err("Relative prefix cannot be empty".to_string());
    }
    if let Some(root) = root {
        if !root.is_absolute() {
            return Err(format!("Project root must be absolute: {}", root.display()));
        }
    }
    Ok(())
}

impl LocatorConfig {
    /// Create a new locator config builder.
    pub fn builder() -> LocatorConfigBuilder {
        LocatorConfigBuilder::default()
    }

    /// Create a config resolving relative paths against `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: Some(project_root.into()),
            ..Self::default()
        }
    }

    /// Check a config that did not come from the builder, e.g. one read
    /// from a file.
    pub fn validate(&self) -> Result<(), LocateError> {
        check(Some(&self.relative_prefix), self.project_root.as_deref())
            .map_err(|message| LocateError::InvalidConfig { message })
    }

    /// Path encoding rules derived from this config.
    pub fn encoding(&self) -> PathEncoding<'_> {
        PathEncoding::new(self.project_root.as_deref(), &self.relative_prefix)
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            relative_prefix: default_relative_prefix(),
            expand_new_folders: true,
            undo_depth: default_undo_depth(),
        }
    }
}
