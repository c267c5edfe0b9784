//! Error types for tessera-source.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while fetching the descriptor list. All of them are fatal to a
/// synchronization pass.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A path the source depends on (dispatcher script, fixture file) is missing.
    #[error("descriptor source not found at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited non-zero.
    #[error("`{program}` exited with code {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// Output was not a JSON array of component descriptors.
    #[error("malformed descriptor list from {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SourceError {
    SourceError::Io {
        path: path.into(),
        source,
    }
}
