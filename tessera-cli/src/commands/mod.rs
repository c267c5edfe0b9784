pub mod render;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use tessera_core::config::{self, TesseraConfig};

/// Configuration from `--config` or the default lookup locations.
pub fn load_config(explicit: Option<&Path>) -> Result<TesseraConfig> {
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    let (_, config) = config::discover(explicit, &cwd).context("failed to load configuration")?;
    Ok(config)
}

/// `--root` wins over `mirror_root` from the configuration.
pub fn mirror_root(flag: Option<PathBuf>, config: &TesseraConfig) -> Result<PathBuf> {
    flag.or_else(|| config.mirror_root.clone())
        .context("no mirror root configured; pass --root or set `mirror_root` in tessera.yaml")
}
