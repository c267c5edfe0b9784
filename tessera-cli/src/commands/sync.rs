//! `tessera sync`: fetch descriptors and reconcile the mirror.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tessera_core::SourceConfig;
use tessera_source::source_from_config;
use tessera_sync::{run_observed, SyncEvent, SyncOptions, SyncReport, WriteResult};

use super::{load_config, mirror_root};

/// Arguments for `tessera sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Configuration file (defaults to ./tessera.yaml, then the user config dir).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Mirror root directory; must already exist.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Discover components from a TYPO3 instance root.
    #[arg(long, group = "source", value_name = "DIR")]
    pub typo3: Option<PathBuf>,

    /// Fetch the descriptor list over HTTP.
    #[arg(long, group = "source")]
    pub url: Option<String>,

    /// Read the descriptor list from a JSON file.
    #[arg(long, group = "source", value_name = "JSON")]
    pub file: Option<PathBuf>,

    /// Show what would change without touching the mirror.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let source_config = self
            .source_override()
            .or_else(|| config.source.clone())
            .context(
                "no descriptor source configured; pass --typo3, --url or --file, \
                 or set `source` in tessera.yaml",
            )?;
        let root = mirror_root(self.root.clone(), &config)?;
        let source =
            source_from_config(&source_config).context("failed to set up descriptor source")?;

        let options = SyncOptions {
            dry_run: self.dry_run,
            preview_extension: config.preview_extension.clone(),
        };
        let prefix = if self.dry_run { "[dry-run] " } else { "" };

        let result = run_observed(&*source, &root, options, |event| match event {
            SyncEvent::Accepted(descriptor) => println!("  {} {descriptor}", "✓".green()),
            SyncEvent::Skipped(descriptor) => {
                println!("  {} {descriptor} (invalid, skipped)", "–".yellow())
            }
            SyncEvent::State(_) => {}
        });

        match result {
            Ok(report) => {
                print_report(&report, prefix);
                Ok(())
            }
            Err(e) => {
                println!("{prefix}{} sync of '{}' failed", "✗".red().bold(), root.display());
                Err(e).with_context(|| format!("sync failed for '{}'", root.display()))
            }
        }
    }

    fn source_override(&self) -> Option<SourceConfig> {
        if let Some(root) = &self.typo3 {
            return Some(SourceConfig::Typo3 { root: root.clone() });
        }
        if let Some(url) = &self.url {
            return Some(SourceConfig::Http {
                url: url.clone(),
                timeout_secs: None,
            });
        }
        self.file
            .as_ref()
            .map(|path| SourceConfig::File { path: path.clone() })
    }
}

fn print_report(report: &SyncReport, prefix: &str) {
    let elapsed = report.finished_at - report.started_at;
    println!(
        "{prefix}{} synced {} component(s) from {} ({} written, {} unchanged, {} skipped) in {}ms",
        "✓".green().bold(),
        report.accepted.len(),
        report.source.source,
        report.changed(),
        report.unchanged(),
        report.skipped.len(),
        elapsed.num_milliseconds(),
    );

    for write in &report.writes {
        match write {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { .. } => {}
        }
    }
    for path in &report.deleted {
        println!("  {}  {path}", "✗".red());
    }
    for path in &report.would_delete {
        println!("  -  {path}");
    }
    for dir in &report.pruned {
        println!("  {}  {dir}/", "✗".red());
    }
    for (path, reason) in &report.delete_failures {
        println!("  {}  {path}: {reason}", "!".yellow().bold());
    }
}
