//! YAML configuration.
//!
//! # Lookup order
//!
//! 1. an explicit path (`--config`), which must exist
//! 2. `./tessera.yaml`
//! 3. `<config_dir>/tessera/config.yaml` (via `dirs::config_dir()`)
//!
//! Relative paths inside a config file resolve against the file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::DEFAULT_PREVIEW_EXTENSION;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tessera.yaml";

/// Where descriptors come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// TYPO3 instance: `php <root>/typo3/cli_dispatch.phpsh extbase component:discover`.
    Typo3 { root: PathBuf },
    /// Arbitrary command printing a JSON array on stdout.
    Cli {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_dir: Option<PathBuf>,
    },
    /// HTTP GET returning a JSON array.
    Http {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
    },
    /// JSON file on disk.
    File { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderEngineKind {
    #[default]
    Tera,
    Cli,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub engine: RenderEngineKind,
    /// Program for the CLI engine (e.g. `php`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Root of `tessera.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesseraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_root: Option<PathBuf>,
    #[serde(default = "default_preview_extension")]
    pub preview_extension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_preview_extension() -> String {
    DEFAULT_PREVIEW_EXTENSION.to_owned()
}

impl Default for TesseraConfig {
    fn default() -> Self {
        Self {
            mirror_root: None,
            preview_extension: default_preview_extension(),
            source: None,
            render: RenderConfig::default(),
        }
    }
}

impl TesseraConfig {
    /// Make relative paths absolute against `base`.
    pub fn resolve_relative(mut self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.mirror_root = self.mirror_root.map(join);
        self.source = self.source.map(|source| match source {
            SourceConfig::Typo3 { root } => SourceConfig::Typo3 { root: join(root) },
            SourceConfig::File { path } => SourceConfig::File { path: join(path) },
            SourceConfig::Cli {
                program,
                args,
                working_dir,
            } => SourceConfig::Cli {
                program,
                args,
                working_dir: working_dir.map(join),
            },
            http @ SourceConfig::Http { .. } => http,
        });
        self
    }
}

/// Load a config file. Relative paths resolve against its directory.
pub fn load_at(path: &Path) -> Result<TesseraConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: TesseraConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.resolve_relative(base))
}

/// Implicit lookup locations, in priority order.
pub fn default_locations(cwd: &Path) -> Vec<PathBuf> {
    let mut locations = vec![cwd.join(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("tessera").join("config.yaml"));
    }
    locations
}

/// Resolve the effective config: the explicit path if given, else the first
/// existing default location, else built-in defaults.
pub fn discover(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<(Option<PathBuf>, TesseraConfig), ConfigError> {
    if let Some(path) = explicit {
        return Ok((Some(path.to_path_buf()), load_at(path)?));
    }
    for candidate in default_locations(cwd) {
        if candidate.is_file() {
            tracing::debug!("using config {}", candidate.display());
            let config = load_at(&candidate)?;
            return Ok((Some(candidate), config));
        }
    }
    Ok((None, TesseraConfig::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
