//! # tagscan
//!
//! Lists TODO, FIXME, NOTE and custom tags found in source-code comments.
//!
//! ## Quick Start
//!
//! ```bash
//! # Scan the current directory
//! tagscan
//!
//! # Only Rust files, as JSON
//! tagscan src --include '**/*.rs' --json
//!
//! # Custom tags, rescanning on every change
//! tagscan --tag HACK --tag XXX --watch
//! ```

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tagscan_core::config::PROJECT_CONFIG_FILE;
use tagscan_core::{
    Config, DocumentId, FileChange, FileProvider, FoundTag, Scanner, SkippedFile, TagConfig,
    TagTree, Workspace,
};

/// tagscan - find tags in source-code comments
#[derive(Parser, Debug)]
#[command(name = "tagscan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder to scan
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Glob of files to scan, relative to PATH
    #[arg(short, long, value_name = "GLOB")]
    include: Option<String>,

    /// Glob of files to leave out, on top of the configured ones
    #[arg(short, long, value_name = "GLOB")]
    exclude: Option<String>,

    /// Config file to use instead of the usual lookup
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tag to look for; repeat for more. Replaces the configured tags
    #[arg(short, long = "tag", value_name = "NAME")]
    tags: Vec<String>,

    /// Print the tags as JSON
    #[arg(long)]
    json: bool,

    /// Keep running and rescan changed files
    #[arg(short, long)]
    watch: bool,

    /// Write the effective config to PATH/.tagscan.toml and exit
    #[arg(long)]
    init: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    tags: Vec<FoundTag>,
    skipped: &'a [SkippedFile],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();

    tracing::info!("Starting tagscan v{}", env!("CARGO_PKG_VERSION"));

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Cannot open {}", args.path.display()))?;

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Cannot load config {}", path.display()))?,
        None => Config::load_for_root(&root).context("Cannot load config")?,
    };
    if !args.tags.is_empty() {
        config.tags = args.tags.iter().map(TagConfig::new).collect();
    }

    if args.init {
        let path = root.join(PROJECT_CONFIG_FILE);
        config.save_to(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let mut scanner = Scanner::with_syntaxes(config.comment_syntaxes()?);
    if let Err(e) = scanner.configure(&config.tags) {
        if scanner.tags().is_empty() {
            return Err(e).context("No usable tags configured");
        }
    }

    let mut workspace = Workspace::open(&root, &config)?;
    let include = args.include.as_deref().unwrap_or(&config.scan.include);
    let exclude = args.exclude.as_deref();

    let batch = scanner.scan_many(&workspace, include, exclude).await?;
    print_report(&scanner, &root, &batch.skipped, args.json)?;

    if args.watch {
        let debounce = Duration::from_millis(config.scan.debounce_ms);
        watch(&mut scanner, &mut workspace, include, exclude, debounce, args.json).await?;
    }

    Ok(())
}

fn print_report(
    scanner: &Scanner,
    root: &Path,
    skipped: &[SkippedFile],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let report = JsonReport {
            tags: scanner.all_cached_sorted(),
            skipped,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let tree = TagTree::build(scanner.cache(), Some(root));
    print!("{tree}");
    println!("{} tags in {} files", tree.tag_count(), tree.groups.len());

    if !skipped.is_empty() {
        println!("{} files skipped:", skipped.len());
        for file in skipped {
            println!("  {}: {}", file.path.display(), file.reason);
        }
    }
    Ok(())
}

/// Rescans changed files until interrupted.
///
/// Changes are collected until no new one arrives for `debounce`, then
/// applied together and the report printed again. A changed file is scanned
/// only if a batch scan with the same globs would list it.
async fn watch(
    scanner: &mut Scanner,
    workspace: &mut Workspace,
    include: &str,
    exclude: Option<&str>,
    debounce: Duration,
    json: bool,
) -> anyhow::Result<()> {
    let mut changes = workspace.start_watching()?;

    loop {
        let first = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = changes.recv() => match change {
                Some(change) => change,
                None => break,
            },
        };

        let mut pending = HashMap::new();
        pending.insert(first.path().to_path_buf(), first);
        while let Ok(Some(change)) = tokio::time::timeout(debounce, changes.recv()).await {
            pending.insert(change.path().to_path_buf(), change);
        }

        let candidates: HashSet<PathBuf> =
            workspace.find_files(include, exclude)?.files.into_iter().collect();
        let mut updated = false;
        for change in pending.into_values() {
            updated |= apply_change(scanner, workspace, &candidates, &change);
        }
        if updated {
            print_report(scanner, workspace.root(), &[], json)?;
        }
    }

    tracing::info!("Stopped watching");
    Ok(())
}

/// Brings the cache up to date with one file change.
///
/// `candidates` are the files a batch scan would list right now. Returns
/// true if the cache was touched.
fn apply_change(
    scanner: &mut Scanner,
    workspace: &Workspace,
    candidates: &HashSet<PathBuf>,
    change: &FileChange,
) -> bool {
    let path = change.path();
    let id = DocumentId::from_path(path);
    let shown = workspace.relative(path).unwrap_or_else(|| path.to_path_buf());

    let gone = matches!(change, FileChange::Deleted(_)) || !path.is_file();
    if gone || !candidates.contains(path) {
        if !scanner.cache().contains(&id) {
            return false;
        }
        tracing::debug!("{} no longer scanned", shown.display());
        scanner.invalidate(Some(&id));
        return true;
    }

    match workspace.open(path) {
        Ok(doc) => {
            scanner.scan_document(&doc);
        }
        Err(e) => {
            tracing::warn!("Skipping {}: {}", shown.display(), e);
            scanner.invalidate(Some(&id));
        }
    }
    true
}
