//! `tessera status`: what the last pass left in the mirror.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tessera_render::load_shared;
use tessera_sync::manifest::{load_previous, manifest_path};
use tessera_sync::session::key_to_relative;

use super::{load_config, mirror_root};

/// Arguments for `tessera status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Mirror root directory.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let root = mirror_root(self.root.clone(), &config)?;
        let report = build_report(&root)?;
        if self.json {
            return print_json(&report);
        }
        print_table(&report);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum FileState {
    Present,
    Missing,
    Unsafe,
}

#[derive(Debug, Serialize)]
struct FileStatus {
    path: String,
    state: FileState,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    root: String,
    source: Option<String>,
    last_sync_at: Option<String>,
    files: Vec<FileStatus>,
}

impl StatusReport {
    fn missing(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.state != FileState::Present)
            .count()
    }
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "file")]
    path: String,
    #[tabled(rename = "state")]
    state: String,
}

fn build_report(root: &Path) -> Result<StatusReport> {
    let source = load_shared(root)
        .with_context(|| format!("failed to read shared context in '{}'", root.display()))?
        .map(|shared| shared.source);

    let last_sync_at = std::fs::metadata(manifest_path(root))
        .and_then(|meta| meta.modified())
        .ok()
        .map(|time| DateTime::<Utc>::from(time).to_rfc3339());

    let files = load_previous(root)
        .into_iter()
        .map(|key| {
            let state = match key_to_relative(&key) {
                Some(relative) if root.join(&relative).is_file() => FileState::Present,
                Some(_) => FileState::Missing,
                None => FileState::Unsafe,
            };
            FileStatus { path: key, state }
        })
        .collect();

    Ok(StatusReport {
        root: root.display().to_string(),
        source,
        last_sync_at,
        files,
    })
}

fn print_json(report: &StatusReport) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(report).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(report: &StatusReport) {
    println!(
        "Tessera v{} | {} | {} files | {} missing",
        env!("CARGO_PKG_VERSION"),
        report.root,
        report.files.len(),
        report.missing(),
    );
    if let Some(source) = &report.source {
        println!("source: {source}");
    }

    if report.files.is_empty() {
        println!("No manifest found. Run 'tessera sync' first.");
        return;
    }

    let rows: Vec<StatusTableRow> = report
        .files
        .iter()
        .map(|file| StatusTableRow {
            path: file.path.clone(),
            state: state_label(file.state),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if report.missing() > 0 {
        println!("Run 'tessera sync' to restore missing files.");
    }
}

fn state_label(state: FileState) -> String {
    match state {
        FileState::Present => "present".green().to_string(),
        FileState::Missing => "missing".red().bold().to_string(),
        FileState::Unsafe => "ignored".bright_black().to_string(),
    }
}
