//! Error types for tessera-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the YAML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },
}

/// Errors raised while resolving a descriptor to a directory path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// A name slugified to the empty string.
    #[error("name {name:?} has no filesystem-safe characters")]
    EmptySegment { name: String },

    /// A template extension that is missing or would not stay a single
    /// file-name suffix.
    #[error("invalid template extension {extension:?}")]
    InvalidExtension { extension: String },
}
