//! Explicit per-pass state, threaded through every step of a pass.
//!
//! A [`SyncSession`] owns the mirror root handle, the write log consumed by
//! the manifest reconciler, the pass-scoped config cache and the pass
//! options. Nothing about a pass lives in global state, so independent
//! sessions (e.g. parallel tests on separate roots) never interact.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::error::SyncError;
use crate::pipeline::SyncOptions;
use crate::store::{render_document, ConfigStore, Document};
use crate::writer::{atomic_write, WriteResult};

#[derive(Debug)]
pub struct SyncSession {
    root: PathBuf,
    options: SyncOptions,
    store: ConfigStore,
    /// Mirror-relative keys of every file written (or confirmed unchanged).
    written: BTreeSet<String>,
    writes: Vec<WriteResult>,
}

impl SyncSession {
    pub fn new(root: impl Into<PathBuf>, options: SyncOptions) -> Self {
        Self {
            root: root.into(),
            options,
            store: ConfigStore::new(),
            written: BTreeSet::new(),
            writes: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub fn absolute(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Write a mirror-relative file and record it in the write log.
    pub fn write_file(&mut self, relative: &Path, content: &[u8]) -> Result<WriteResult, SyncError> {
        let absolute = self.absolute(relative);
        let result = atomic_write(&absolute, content, self.options.dry_run)?
            .relocate(relative.to_path_buf());
        self.written.insert(manifest_key(relative));
        self.writes.push(result.clone());
        Ok(result)
    }

    /// Config document at a mirror-relative path (pass cache first).
    pub fn load_document(&mut self, relative: &Path) -> Result<Document, SyncError> {
        let absolute = self.absolute(relative);
        self.store.load(&absolute)
    }

    /// Persist a config document and refresh the pass cache.
    pub fn write_document(
        &mut self,
        relative: &Path,
        document: Document,
    ) -> Result<WriteResult, SyncError> {
        let bytes = render_document(&document)?;
        let result = self.write_file(relative, &bytes)?;
        let absolute = self.absolute(relative);
        self.store.update(&absolute, document);
        Ok(result)
    }

    /// Every mirror-relative path written in this pass.
    pub fn written(&self) -> &BTreeSet<String> {
        &self.written
    }

    pub fn writes(&self) -> &[WriteResult] {
        &self.writes
    }

    pub(crate) fn take_writes(&mut self) -> Vec<WriteResult> {
        std::mem::take(&mut self.writes)
    }
}

/// Manifest key for a mirror-relative path: components joined with `/`.
pub fn manifest_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a manifest key back into a relative path. Absolute keys and keys
/// that climb out of the mirror root (`..`) are rejected.
pub fn key_to_relative(key: &str) -> Option<PathBuf> {
    let path = Path::new(key);
    if key.is_empty() || !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(path.to_path_buf())
}
