//! Manifest reconciler.
//!
//! The manifest at `<root>/components.files.json` is a flat JSON array of the
//! mirror-relative paths the last pass wrote. At the end of a pass the write
//! log becomes the new manifest; anything listed in the previous one that was
//! not written again is deleted, and directories emptied by those deletions
//! are pruned deepest first.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tessera_core::layout::MANIFEST_FILE;

use crate::error::SyncError;
use crate::session::{key_to_relative, manifest_key, SyncSession};

/// What reconciliation did (or, in dry-run, would do) to the mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub deleted: Vec<String>,
    pub would_delete: Vec<String>,
    /// Stale entries that could not be removed, with the reason.
    pub failures: Vec<(String, String)>,
    pub pruned: Vec<String>,
}

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Previous pass's manifest. Missing or corrupt manifests read as empty, so a
/// first run deletes nothing.
pub fn load_previous(root: &Path) -> BTreeSet<String> {
    let path = manifest_path(root);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("no previous manifest at {}", path.display());
            return BTreeSet::new();
        }
        Err(e) => {
            tracing::warn!("cannot read manifest {} ({e}); treating as empty", path.display());
            return BTreeSet::new();
        }
    };
    match serde_json::from_slice::<Vec<String>>(&bytes) {
        Ok(entries) => entries.into_iter().collect(),
        Err(e) => {
            tracing::warn!("manifest {} is corrupt ({e}); treating as empty", path.display());
            BTreeSet::new()
        }
    }
}

/// Pretty-printed manifest bytes: a sorted JSON array.
pub fn render_manifest(entries: &BTreeSet<String>) -> Result<Vec<u8>, SyncError> {
    let mut bytes = serde_json::to_vec_pretty(entries)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Reconcile the session's write log against the previous manifest.
///
/// Deletion is best-effort: a stale file that cannot be removed is logged and
/// recorded in [`ReconcileOutcome::failures`], and the new manifest is still
/// persisted. In dry-run nothing is deleted, pruned or saved.
pub fn reconcile(session: &mut SyncSession) -> Result<ReconcileOutcome, SyncError> {
    let previous = load_previous(session.root());

    let mut current = session.written().clone();
    current.insert(MANIFEST_FILE.to_owned());

    let mut outcome = ReconcileOutcome::default();
    let mut removed: Vec<PathBuf> = Vec::new();

    for key in previous.difference(&current) {
        let Some(relative) = key_to_relative(key) else {
            tracing::warn!("ignoring unsafe manifest entry {key:?}");
            continue;
        };
        let absolute = session.absolute(&relative);

        if session.dry_run() {
            tracing::info!("[dry-run] would delete: {}", absolute.display());
            outcome.would_delete.push(key.clone());
            continue;
        }

        match std::fs::remove_file(&absolute) {
            Ok(()) => {
                tracing::info!("deleted stale file: {}", absolute.display());
                outcome.deleted.push(key.clone());
                removed.push(relative);
            }
            Err(e) => {
                tracing::warn!("could not delete stale file {}: {e}", absolute.display());
                outcome.failures.push((key.clone(), e.to_string()));
                if e.kind() == ErrorKind::NotFound {
                    removed.push(relative);
                }
            }
        }
    }

    session.write_file(Path::new(MANIFEST_FILE), &render_manifest(&current)?)?;

    if !session.dry_run() {
        outcome.pruned = prune_empty_dirs(session.root(), &removed);
    }
    Ok(outcome)
}

/// Remove now-empty ancestors of `removed`, deepest first. The mirror root
/// itself is never removed, nor is any directory outside the removed files'
/// ancestry.
fn prune_empty_dirs(root: &Path, removed: &[PathBuf]) -> Vec<String> {
    let mut candidates: BTreeSet<PathBuf> = BTreeSet::new();
    for file in removed {
        candidates.extend(
            file.ancestors()
                .skip(1)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf),
        );
    }

    let mut ordered: Vec<PathBuf> = candidates.into_iter().collect();
    ordered.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

    let mut pruned = Vec::new();
    for dir in ordered {
        let absolute = root.join(&dir);
        let is_empty = match std::fs::read_dir(&absolute) {
            Ok(mut entries) => entries.next().is_none(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!("cannot inspect {}: {e}", absolute.display());
                false
            }
        };
        if !is_empty {
            continue;
        }
        match std::fs::remove_dir(&absolute) {
            Ok(()) => {
                tracing::debug!("pruned empty directory: {}", absolute.display());
                pruned.push(manifest_key(&dir));
            }
            Err(e) => tracing::warn!("could not prune {}: {e}", absolute.display()),
        }
    }
    pruned
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SyncOptions;
    use std::fs;
    use tempfile::TempDir;

    fn seed_manifest(root: &Path, entries: &[&str]) {
        let set: BTreeSet<String> = entries.iter().map(|s| s.to_string()).collect();
        fs::write(manifest_path(root), render_manifest(&set).unwrap()).unwrap();
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn empty_manifest_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(load_previous(tmp.path()).is_empty());
    }

    #[test]
    fn corrupt_manifest_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(manifest_path(tmp.path()), "{\"not\": \"an array\"}").unwrap();
        assert!(load_previous(tmp.path()).is_empty());
    }

    #[test]
    fn first_run_persists_write_log_and_itself() {
        let tmp = TempDir::new().unwrap();
        let mut session = SyncSession::new(tmp.path(), SyncOptions::default());
        session.write_file(Path::new("a/a.html"), b"a").unwrap();

        let outcome = reconcile(&mut session).unwrap();
        assert_eq!(outcome, ReconcileOutcome::default());

        let saved: Vec<_> = load_previous(tmp.path()).into_iter().collect();
        assert_eq!(saved, vec!["a/a.html", MANIFEST_FILE]);
        assert!(!tmp
            .path()
            .join(format!("{MANIFEST_FILE}.tessera.tmp"))
            .exists());
    }

    #[test]
    fn stale_files_are_deleted_and_empty_dirs_pruned() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "atoms/button/button.html");
        touch(tmp.path(), "atoms/link/link.html");
        fs::create_dir_all(tmp.path().join("unrelated-empty")).unwrap();
        seed_manifest(
            tmp.path(),
            &["atoms/button/button.html", "atoms/link/link.html", MANIFEST_FILE],
        );

        let mut session = SyncSession::new(tmp.path(), SyncOptions::default());
        session.write_file(Path::new("atoms/link/link.html"), b"x").unwrap();
        let outcome = reconcile(&mut session).unwrap();

        assert_eq!(outcome.deleted, vec!["atoms/button/button.html"]);
        assert_eq!(outcome.pruned, vec!["atoms/button"]);
        assert!(!tmp.path().join("atoms/button").exists());
        assert!(tmp.path().join("atoms/link/link.html").is_file());
        assert!(tmp.path().join("unrelated-empty").is_dir());
        assert!(!load_previous(tmp.path()).contains("atoms/button/button.html"));
    }

    #[test]
    fn pruning_climbs_until_a_non_empty_directory() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/b/c/file.html");
        seed_manifest(tmp.path(), &["a/b/c/file.html"]);

        let mut session = SyncSession::new(tmp.path(), SyncOptions::default());
        let outcome = reconcile(&mut session).unwrap();

        assert_eq!(outcome.pruned, vec!["a/b/c", "a/b", "a"]);
        assert!(tmp.path().is_dir());
        assert!(!tmp.path().join("a").exists());
    }

    #[test]
    fn unsafe_entries_are_never_deleted() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("mirror");
        fs::create_dir_all(&root).unwrap();
        touch(outer.path(), "keep.txt");
        seed_manifest(&root, &["../keep.txt"]);

        let mut session = SyncSession::new(&root, SyncOptions::default());
        let outcome = reconcile(&mut session).unwrap();
        assert!(outcome.deleted.is_empty());
        assert!(outer.path().join("keep.txt").is_file());
    }

    #[test]
    fn deletion_failure_is_recorded_and_manifest_still_saved() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "stale/inner.html");
        seed_manifest(tmp.path(), &["stale"]);

        let mut session = SyncSession::new(tmp.path(), SyncOptions::default());
        let outcome = reconcile(&mut session).unwrap();

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "stale");
        assert!(tmp.path().join("stale/inner.html").is_file());
        assert!(!load_previous(tmp.path()).contains("stale"));
    }

    #[test]
    fn dry_run_reports_without_touching_disk() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "old/old.html");
        seed_manifest(tmp.path(), &["old/old.html", MANIFEST_FILE]);
        let before = fs::read(manifest_path(tmp.path())).unwrap();

        let options = SyncOptions {
            dry_run: true,
            ..SyncOptions::default()
        };
        let mut session = SyncSession::new(tmp.path(), options);
        let outcome = reconcile(&mut session).unwrap();

        assert_eq!(outcome.would_delete, vec!["old/old.html"]);
        assert!(outcome.deleted.is_empty());
        assert!(tmp.path().join("old/old.html").is_file());
        assert_eq!(fs::read(manifest_path(tmp.path())).unwrap(), before);
    }
}
