//! Collection initializer.
//!
//! Walks a [`ResolvedPath`] root to leaf. At each level the directory is
//! created if absent and its `<slug>.config.json` record is stamped with the
//! level's prefix (and label, when the source supplies one). A level is only
//! entered once the previous one succeeded.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use tessera_core::{layout, DirectoryConfig, ResolvedPath};

use crate::error::SyncError;
use crate::session::SyncSession;
use crate::store::{to_document, Document};

/// Ensure every directory of `resolved` exists and carries a synchronized
/// directory record. Returns the mirror-relative component directory.
pub fn init_collections(
    session: &mut SyncSession,
    resolved: &ResolvedPath,
) -> Result<PathBuf, SyncError> {
    for (index, segment) in resolved.segments().enumerate() {
        let levels = index + 1;
        let relative = resolved.relative_dir_at(levels);
        ensure_directory(session, &relative)?;

        let config_path = relative.join(layout::config_file_name(&segment.slug));
        let document = session.load_document(&config_path)?;
        let mut record = directory_record(&config_path, document);
        record.stamp(&resolved.prefix_at(levels), segment.label.as_deref());
        session.write_document(&config_path, to_document(&record)?)?;
    }
    Ok(resolved.component_dir())
}

/// Create one directory level. A pre-existing directory is fine; anything
/// else at that path is a [`SyncError::DirectoryCreation`].
fn ensure_directory(session: &SyncSession, relative: &Path) -> Result<(), SyncError> {
    let absolute = session.absolute(relative);
    match std::fs::metadata(&absolute) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(SyncError::DirectoryCreation {
                path: absolute,
                reason: "path exists and is not a directory".to_owned(),
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(SyncError::DirectoryCreation {
                path: absolute,
                reason: e.to_string(),
            })
        }
    }

    if session.dry_run() {
        tracing::info!("[dry-run] would create directory: {}", absolute.display());
        return Ok(());
    }

    match std::fs::create_dir(&absolute) {
        Ok(()) => {
            tracing::debug!("created directory: {}", absolute.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists && absolute.is_dir() => Ok(()),
        Err(e) => Err(SyncError::DirectoryCreation {
            path: absolute,
            reason: e.to_string(),
        }),
    }
}

fn directory_record(path: &Path, document: Document) -> DirectoryConfig {
    match serde_json::from_value(Value::Object(document)) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(
                "directory config {} is unreadable ({e}); starting from a fresh record",
                path.display()
            );
            DirectoryConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
