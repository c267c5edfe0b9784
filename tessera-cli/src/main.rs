//! Tessera: mirror a component library into a documentation tree.
//!
//! # Usage
//!
//! ```text
//! tessera sync [--config <file>] [--root <dir>] [--typo3 <dir> | --url <url> | --file <json>] [--dry-run]
//! tessera status [--config <file>] [--root <dir>] [--json]
//! tessera render <component-dir> [--variant <name>] [--engine tera|cli] [--preview]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{render::RenderArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tessera",
    version,
    about = "Synchronize component descriptors into a pattern-library mirror",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch descriptors and reconcile the mirror with them.
    Sync(SyncArgs),

    /// Show the files tracked by the mirror's manifest.
    Status(StatusArgs),

    /// Render one mirrored component variant to stdout.
    Render(RenderArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Render(args) => args.run(),
    }
}

/// Log records go to stderr so `--json` and rendered markup stay clean on
/// stdout. `RUST_LOG` overrides the `info` default.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
