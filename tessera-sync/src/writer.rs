//! Hash-gated atomic writer.
//!
//! ## `atomic_write` protocol
//!
//! 1. SHA-256 hash the new bytes.
//! 2. SHA-256 hash the bytes currently on disk (if any).
//! 3. Identical → skip, the file and its mtime are left untouched.
//! 4. Write to `<path>.tessera.tmp`.
//! 5. Rename to the final path (atomic on POSIX).
//!
//! Content is written byte-exact: templates are never re-encoded and line
//! endings are never normalized.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped: on-disk content already matches.
    Unchanged { path: PathBuf },
    /// Dry-run mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    /// Same outcome, reported against another path (e.g. mirror-relative).
    pub fn relocate(self, path: PathBuf) -> Self {
        match self {
            WriteResult::Written { .. } => WriteResult::Written { path },
            WriteResult::Unchanged { .. } => WriteResult::Unchanged { path },
            WriteResult::WouldWrite { .. } => WriteResult::WouldWrite { path },
        }
    }

    /// `true` unless the file was already up to date.
    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

fn digest(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Digest of the file at `path`, or `None` when it does not exist.
fn digest_on_disk(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(digest(&bytes))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Atomically write `content` to `path` unless the file already holds it.
pub fn atomic_write(path: &Path, content: &[u8], dry_run: bool) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.tessera.tmp", path.display()));
    atomic_write_with_tmp(path, content, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &[u8],
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    if digest_on_disk(path)?.as_deref() == Some(digest(content).as_str()) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("button.html");
        let result = atomic_write(&path, b"<button></button>", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"<button></button>");
    }

    #[test]
    fn second_write_same_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.json");
        atomic_write(&path, b"same", false).unwrap();
        let result = atomic_write(&path, b"same", false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
        assert!(!result.is_change());
    }

    #[test]
    fn changed_content_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.json");
        atomic_write(&path, b"v1", false).unwrap();
        let result = atomic_write(&path, b"v2", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.html");
        let result = atomic_write(&path, b"content", true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn crlf_content_is_written_byte_exact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("template.html");
        atomic_write(&path, b"line1\r\nline2\r\n", false).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"line1\r\nline2\r\n");

        let result = atomic_write(&path, b"line1\nline2\n", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.html");
        atomic_write(&path, b"data", false).unwrap();
        let tmp_path = PathBuf::from(format!("{}.tessera.tmp", path.display()));
        assert!(!tmp_path.exists(), ".tessera.tmp must be cleaned up");
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("file.html");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("file.html.tessera.tmp");

        let result = atomic_write_with_tmp(&path, b"new content", false, &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root bypasses directory permissions; only assert when the rename failed.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp_path.exists(), ".tessera.tmp should be cleaned up");
        }
    }
}
