//! Scan entry point: references in, tree and selection out.

use std::time::Instant;

use tracing::debug;

use texloc_core::{LocatorConfig, SelectionKey, TextureRef, TextureTree};

use crate::builder::{PreviewRefresh, TreeBuilder};
use crate::index::PathIndex;

/// Result of one scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// The freshly built tree.
    pub tree: TextureTree,
    /// Index of the previously selected entity in the new tree, if it survived.
    pub selected: Option<usize>,
    /// Host previews to reload.
    pub previews: Vec<PreviewRefresh>,
}

/// Builds texture trees from reference lists.
#[derive(Debug, Clone, Default)]
pub struct TextureScanner {
    config: LocatorConfig,
}

impl TextureScanner {
    /// Create a scanner with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with a custom configuration.
    pub fn with_config(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Build a tree from `refs` and re-resolve `prior` against it.
    ///
    /// `prior` must be captured from the previous tree before calling this;
    /// indices from the previous tree mean nothing in the new one.
    pub fn scan(&self, refs: &[TextureRef], prior: Option<&SelectionKey>) -> ScanOutcome {
        self.scan_with(TreeBuilder::with_config(&self.config), refs, prior)
    }

    /// Like [`scan`](Self::scan), keeping folders collapsed that were
    /// collapsed in `previous`.
    pub fn rescan(
        &self,
        previous: &TextureTree,
        refs: &[TextureRef],
        prior: Option<&SelectionKey>,
    ) -> ScanOutcome {
        let builder = TreeBuilder::with_config(&self.config).carry_expansion(previous);
        self.scan_with(builder, refs, prior)
    }

    fn scan_with(
        &self,
        builder: TreeBuilder,
        refs: &[TextureRef],
        prior: Option<&SelectionKey>,
    ) -> ScanOutcome {
        let start = Instant::now();

        let index = PathIndex::build(refs);
        let built = builder.build(index);
        let tree = TextureTree::new(built.nodes, built.warnings, start.elapsed());
        let selected = prior.and_then(|key| key.resolve(&tree));

        debug!(
            references = refs.len(),
            folders = tree.stats.total_folders,
            files = tree.stats.total_files,
            skipped = tree.warnings.len(),
            ?selected,
            "built texture tree"
        );

        ScanOutcome {
            tree,
            selected,
            previews: built.previews,
        }
    }
}
