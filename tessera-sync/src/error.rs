//! Error types for tessera-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use tessera_core::PathError;
use tessera_source::SourceError;

/// Registrar step that failed for a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    ResolvePath,
    InitCollections,
    WriteTemplate,
    WritePreview,
    MergeConfig,
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            RegistrationStep::ResolvePath => "resolving path",
            RegistrationStep::InitCollections => "initializing collections",
            RegistrationStep::WriteTemplate => "writing template",
            RegistrationStep::WritePreview => "writing preview",
            RegistrationStep::MergeConfig => "merging component config",
        };
        f.write_str(step)
    }
}

/// All errors that can abort a synchronization pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The descriptor source failed; nothing was written.
    #[error("descriptor source error: {0}")]
    Source(#[from] SourceError),

    /// The host-owned mirror root does not exist or is not a directory.
    #[error("mirror root {path} does not exist or is not a directory")]
    MirrorRoot { path: PathBuf },

    /// A collection directory could not be created.
    #[error("could not create directory {path}: {reason}")]
    DirectoryCreation { path: PathBuf, reason: String },

    /// A valid descriptor without a template body.
    #[error("descriptor has no template")]
    MissingTemplate,

    #[error("invalid component path: {0}")]
    Path(#[from] PathError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Registration of one descriptor failed; the pass is aborted.
    #[error("component {component}: {step} failed: {source}")]
    Descriptor {
        component: String,
        step: RegistrationStep,
        #[source]
        source: Box<SyncError>,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
