//! Error types for tessera-render.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while rendering a mirrored component.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON error while reading records or building the context.
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with code {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    /// The render context carries no `component` identifier.
    #[error("render context has no `component` identifier")]
    MissingComponent,

    #[error("no component record at {path}")]
    MissingRecord { path: PathBuf },

    #[error("component has no variant named {name:?}")]
    MissingVariant { name: String },

    #[error("no template for variant {variant:?} in {dir}")]
    MissingTemplate { dir: PathBuf, variant: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
