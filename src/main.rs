//! texloc - Locate, inspect and repoint the image files used by texture nodes.
//!
//! Usage:
//!   texloc scan <MANIFEST>                               Print the texture tree
//!   texloc select <MANIFEST> <PATH>                      List consumers under a node
//!   texloc change-file <MANIFEST> <FOLDER> <NAME> <NEW>  Repoint one file
//!   texloc change-folder <MANIFEST> <FOLDER> <NEW_DIR>   Re-root a folder
//!   texloc --help                                        Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use texloc_core::NodeKind;
use texloc_ops::{
    LocatorConfig, LocatorSession, ReferenceManifest, RemapOperation, RemapReport, TextureTree,
};

#[derive(Parser)]
#[command(
    name = "texloc",
    version,
    about = "Locate, inspect and repoint texture source files",
    long_about = "texloc groups the image files referenced by a manifest of texture \
                  consumers into a folder tree, and repoints consumers when files move.\n\n\
                  Set TEXLOC_LOG (e.g. TEXLOC_LOG=debug) to control log output."
)]
struct Cli {
    /// Directory project-relative (`//`) paths resolve against.
    /// Overrides the manifest and config file.
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// JSON file with locator settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the texture tree and print it
    Scan {
        /// Manifest of consumers and their stored paths
        manifest: PathBuf,

        /// Start with nested folders collapsed
        #[arg(short, long)]
        collapsed: bool,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the consumers of a file, or of every file under a folder
    Select {
        /// Manifest of consumers and their stored paths
        manifest: PathBuf,

        /// Folder or file path to select
        path: PathBuf,
    },

    /// Point every consumer of one file at a new file
    ChangeFile {
        /// Manifest of consumers and their stored paths
        manifest: PathBuf,

        /// Folder holding the file
        folder: PathBuf,

        /// File name inside the folder
        name: String,

        /// Replacement file
        new: PathBuf,
    },

    /// Move every file under a folder to the same relative place in another directory
    ChangeFolder {
        /// Manifest of consumers and their stored paths
        manifest: PathBuf,

        /// Folder to re-root
        folder: PathBuf,

        /// Replacement directory
        new_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();

    match &cli.command {
        Command::Scan {
            manifest,
            collapsed,
            json,
        } => run_scan(&cli, manifest, *collapsed, *json),
        Command::Select { manifest, path } => run_select(&cli, manifest, path),
        Command::ChangeFile {
            manifest,
            folder,
            name,
            new,
        } => {
            let file = folder.join(name);
            run_remap(&cli, manifest, &file, |session| {
                Ok(RemapOperation::change_file(resolve_arg(session.config(), new)?))
            })
        }
        Command::ChangeFolder {
            manifest,
            folder,
            new_dir,
        } => run_remap(&cli, manifest, folder, |session| {
            Ok(RemapOperation::change_folder(resolve_arg(
                session.config(),
                new_dir,
            )?))
        }),
    }
}

/// Log to stderr, filtered by `TEXLOC_LOG` (warnings only by default).
fn init_logging() {
    let filter = EnvFilter::try_from_env("TEXLOC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Load the manifest and build the locator config for it.
///
/// Settings come from `--config`, then the project root from
/// `--project-root` or the manifest, in that order.
fn open(cli: &Cli, manifest: &Path) -> Result<(ReferenceManifest, LocatorConfig)> {
    let store = ReferenceManifest::load(manifest)
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
    debug!(manifest = %manifest.display(), consumers = store.len(), "loaded manifest");

    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<LocatorConfig>(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => LocatorConfig::default(),
    };

    if let Some(root) = &cli.project_root {
        config.project_root = Some(std::path::absolute(root).context("Invalid project root")?);
    } else if config.project_root.is_none() {
        config.project_root = store.project_root.clone();
    }
    config.validate()?;

    Ok((store, config))
}

/// Resolve a command-line path the way stored paths resolve.
fn resolve_arg(config: &LocatorConfig, path: &Path) -> Result<PathBuf> {
    let encoding = config.encoding();
    let text = path.to_string_lossy();
    let stored = if encoding.is_relative(&text) {
        text.into_owned()
    } else {
        let absolute = std::path::absolute(path)
            .with_context(|| format!("Invalid path {}", path.display()))?;
        absolute.to_string_lossy().into_owned()
    };
    encoding
        .resolve(&stored)
        .ok_or_else(|| eyre!("Empty path"))
}

/// Find the node at `path`, folder first.
fn locate(tree: &TextureTree, path: &Path) -> Option<usize> {
    tree.find_folder(path).or_else(|| tree.find_file(path))
}

fn run_scan(cli: &Cli, manifest: &Path, collapsed: bool, json: bool) -> Result<()> {
    let (store, mut config) = open(cli, manifest)?;
    config.expand_new_folders = !collapsed;

    let mut session = LocatorSession::new(config);
    session.rescan(&store);
    let tree = session.tree();

    if json {
        println!("{}", serde_json::to_string_pretty(tree)?);
        return Ok(());
    }

    println!("{}", "─".repeat(60));
    println!(" {}", manifest.display());
    println!(
        " {} folders, {} files, {} consumers",
        tree.stats.total_folders, tree.stats.total_files, tree.stats.total_consumers
    );
    println!("{}", "─".repeat(60));

    print_tree(tree);

    if tree.has_warnings() {
        println!();
        println!("{} consumer(s) skipped:", tree.warnings.len());
        for warning in &tree.warnings {
            println!("  {}: {}", warning.consumer, warning.message);
        }
    }

    Ok(())
}

fn run_select(cli: &Cli, manifest: &Path, path: &Path) -> Result<()> {
    let (store, config) = open(cli, manifest)?;
    let target = resolve_arg(&config, path)?;

    let mut session = LocatorSession::new(config);
    session.rescan(&store);
    let index = locate(session.tree(), &target)
        .ok_or_else(|| eyre!("No folder or file at {}", target.display()))?;
    session.select(Some(index))?;

    for consumer in session.selected_consumers()? {
        println!("{consumer}");
    }
    Ok(())
}

fn run_remap<F>(cli: &Cli, manifest: &Path, node: &Path, operation: F) -> Result<()>
where
    F: FnOnce(&LocatorSession) -> Result<RemapOperation>,
{
    let (mut store, config) = open(cli, manifest)?;
    let target = resolve_arg(&config, node)?;

    let mut session = LocatorSession::new(config);
    session.rescan(&store);
    let Some(index) = locate(session.tree(), &target) else {
        bail!("No folder or file at {}", target.display());
    };
    session.select(Some(index))?;

    let operation = operation(&session)?;
    let report = session
        .execute(&mut store, &operation)
        .with_context(|| format!("Failed to remap {}", target.display()))?;

    print_report(&report);

    if session.rebuild_required() {
        store
            .save(manifest)
            .with_context(|| format!("Failed to save manifest {}", manifest.display()))?;
        info!(manifest = %manifest.display(), consumers = report.consumers_updated(), "saved manifest");
        session.rescan(&store);
        println!();
        print_tree(session.tree());
    }

    Ok(())
}

/// Print the visible nodes, indented by depth.
fn print_tree(tree: &TextureTree) {
    let mask = tree.visibility_mask();
    for node in tree.iter().filter(|n| mask[n.index]) {
        let indent = "  ".repeat(tree.depth(node.index));
        let label = tree.label(node.index).unwrap_or_default();
        match &node.kind {
            NodeKind::Folder { .. } => {
                let marker = if node.expanded { "▼" } else { "▶" };
                println!("{indent}{marker} {label}/");
            }
            NodeKind::File { consumers, .. } => {
                let names: Vec<&str> = consumers.iter().map(|c| c.as_str()).collect();
                println!("{indent}  {label}  [{}]", names.join(", "));
            }
        }
    }
}

fn print_report(report: &RemapReport) {
    println!(
        "{}: {} file(s) changed, {} consumer(s) updated, {} missing",
        report.kind,
        report.changed,
        report.consumers_updated(),
        report.missing
    );
    for change in &report.changes {
        println!("  {}: {} -> {}", change.consumer, change.previous, change.stored);
    }
    for miss in &report.misses {
        println!("  missing: {miss}");
    }
}
