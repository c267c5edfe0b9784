//! Sync orchestrator: the pass state machine.
//!
//! `Idle → Fetching → Processing(i/N) → Reconciling → Done`, or `Failed`
//! from any non-terminal state. Terminal states are never retried here; the
//! caller decides whether to run another pass.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};

use tessera_core::layout::{DEFAULT_PREVIEW_EXTENSION, SHARED_CONTEXT_FILE};
use tessera_core::{ComponentDescriptor, SharedContext, SharedContextFile};
use tessera_source::DescriptorSource;

use crate::error::SyncError;
use crate::manifest;
use crate::registrar::register;
use crate::session::SyncSession;
use crate::store::to_document;
use crate::writer::WriteResult;

/// Options for a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute everything, mutate nothing.
    pub dry_run: bool,
    /// Extension of `_<slug>-preview.<ext>` files.
    pub preview_extension: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            preview_extension: DEFAULT_PREVIEW_EXTENSION.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    /// 1-based index of the descriptor being processed.
    Processing { index: usize, total: usize },
    Reconciling,
    Done,
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Idle => f.write_str("idle"),
            SyncState::Fetching => f.write_str("fetching"),
            SyncState::Processing { index, total } => write!(f, "processing {index}/{total}"),
            SyncState::Reconciling => f.write_str("reconciling"),
            SyncState::Done => f.write_str("done"),
            SyncState::Failed => f.write_str("failed"),
        }
    }
}

/// Progress notifications emitted while a pass runs.
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    State(SyncState),
    Accepted(&'a ComponentDescriptor),
    Skipped(&'a ComponentDescriptor),
}

/// Summary of a completed pass.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub source: SharedContext,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: SyncState,
    pub accepted: Vec<String>,
    pub skipped: Vec<String>,
    pub writes: Vec<WriteResult>,
    pub deleted: Vec<String>,
    pub would_delete: Vec<String>,
    pub delete_failures: Vec<(String, String)>,
    pub pruned: Vec<String>,
}

impl SyncReport {
    /// Writes that changed (or in dry-run would change) a file.
    pub fn changed(&self) -> usize {
        self.writes.iter().filter(|w| w.is_change()).count()
    }

    pub fn unchanged(&self) -> usize {
        self.writes.len() - self.changed()
    }
}

/// Run one pass of `source` into the mirror at `root`.
pub fn run<S>(source: &S, root: &Path, options: SyncOptions) -> Result<SyncReport, SyncError>
where
    S: DescriptorSource + ?Sized,
{
    run_observed(source, root, options, |_| {})
}

/// [`run`], reporting state transitions and per-descriptor outcomes to
/// `observe` as they happen.
pub fn run_observed<S, F>(
    source: &S,
    root: &Path,
    options: SyncOptions,
    observe: F,
) -> Result<SyncReport, SyncError>
where
    S: DescriptorSource + ?Sized,
    F: FnMut(SyncEvent<'_>),
{
    let mut pass = Pass {
        state: SyncState::Idle,
        observe,
    };
    match pass.execute(source, root, options) {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::error!("sync pass failed: {e}");
            pass.transition(SyncState::Failed);
            Err(e)
        }
    }
}

struct Pass<F> {
    state: SyncState,
    observe: F,
}

impl<F: FnMut(SyncEvent<'_>)> Pass<F> {
    fn transition(&mut self, next: SyncState) {
        tracing::debug!("sync state: {} -> {next}", self.state);
        self.state = next;
        (self.observe)(SyncEvent::State(next));
    }

    fn execute<S>(
        &mut self,
        source: &S,
        root: &Path,
        options: SyncOptions,
    ) -> Result<SyncReport, SyncError>
    where
        S: DescriptorSource + ?Sized,
    {
        let started_at = Utc::now();
        if !root.is_dir() {
            return Err(SyncError::MirrorRoot {
                path: root.to_path_buf(),
            });
        }

        self.transition(SyncState::Fetching);
        let descriptors = source.fetch()?;
        let identity = source.identity();
        tracing::info!(
            "fetched {} descriptor(s) from {} source {}",
            descriptors.len(),
            identity.source_kind,
            identity.source
        );

        let mut session = SyncSession::new(root, options);
        let mut accepted = Vec::new();
        let mut skipped = Vec::new();
        let total = descriptors.len();

        for (index, descriptor) in descriptors.iter().enumerate() {
            self.transition(SyncState::Processing {
                index: index + 1,
                total,
            });
            if !descriptor.valid {
                tracing::info!("skipping invalid component {descriptor}");
                skipped.push(descriptor.to_string());
                (self.observe)(SyncEvent::Skipped(descriptor));
                continue;
            }
            register(&mut session, descriptor)?;
            tracing::info!("accepted component {descriptor}");
            accepted.push(descriptor.to_string());
            (self.observe)(SyncEvent::Accepted(descriptor));
        }

        write_shared_context(&mut session, &identity)?;

        self.transition(SyncState::Reconciling);
        let outcome = manifest::reconcile(&mut session)?;

        self.transition(SyncState::Done);
        Ok(SyncReport {
            source: identity,
            started_at,
            finished_at: Utc::now(),
            state: self.state,
            accepted,
            skipped,
            writes: session.take_writes(),
            deleted: outcome.deleted,
            would_delete: outcome.would_delete,
            delete_failures: outcome.failures,
            pruned: outcome.pruned,
        })
    }
}

/// Record the source identity in `<root>/components.config.json`. Keys other
/// than `context` are left as found.
fn write_shared_context(
    session: &mut SyncSession,
    identity: &SharedContext,
) -> Result<WriteResult, SyncError> {
    let path = Path::new(SHARED_CONTEXT_FILE);
    let mut document = session.load_document(path)?;
    document.extend(to_document(&SharedContextFile {
        context: identity.clone(),
    })?);
    session.write_document(path, document)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;
    use tessera_source::SourceError;

    struct StaticSource(Value);

    impl DescriptorSource for StaticSource {
        fn fetch(&self) -> Result<Vec<ComponentDescriptor>, SourceError> {
            Ok(serde_json::from_value(self.0.clone()).unwrap())
        }

        fn identity(&self) -> SharedContext {
            SharedContext {
                source: "memory".into(),
                source_kind: "static".into(),
            }
        }
    }

    struct BrokenSource;

    impl DescriptorSource for BrokenSource {
        fn fetch(&self) -> Result<Vec<ComponentDescriptor>, SourceError> {
            Err(SourceError::CommandFailed {
                program: "php".into(),
                code: 1,
                stderr: "boom".into(),
            })
        }

        fn identity(&self) -> SharedContext {
            SharedContext {
                source: "broken".into(),
                source_kind: "cli".into(),
            }
        }
    }

    fn button(valid: bool) -> Value {
        json!({
            "name": "Button",
            "path": ["Atoms"],
            "valid": valid,
            "type": "component",
            "class": "Vendor\\Button",
            "extension": "html",
            "template": "<button></button>"
        })
    }

    #[test]
    fn states_progress_to_done() {
        let tmp = TempDir::new().unwrap();
        let source = StaticSource(json!([button(true), button(false)]));
        let mut states = Vec::new();
        let report = run_observed(&source, tmp.path(), SyncOptions::default(), |event| {
            if let SyncEvent::State(state) = event {
                states.push(state);
            }
        })
        .unwrap();

        assert_eq!(
            states,
            vec![
                SyncState::Fetching,
                SyncState::Processing { index: 1, total: 2 },
                SyncState::Processing { index: 2, total: 2 },
                SyncState::Reconciling,
                SyncState::Done,
            ]
        );
        assert_eq!(report.state, SyncState::Done);
        assert_eq!(report.accepted, vec!["Atoms/Button"]);
        assert_eq!(report.skipped, vec!["Atoms/Button"]);
    }

    #[test]
    fn shared_context_records_source_identity() {
        let tmp = TempDir::new().unwrap();
        run(&StaticSource(json!([])), tmp.path(), SyncOptions::default()).unwrap();
        let shared: Value =
            serde_json::from_slice(&fs::read(tmp.path().join(SHARED_CONTEXT_FILE)).unwrap())
                .unwrap();
        assert_eq!(
            shared,
            json!({"context": {"source": "memory", "sourceKind": "static"}})
        );
    }

    #[test]
    fn source_failure_fails_pass_without_writes() {
        let tmp = TempDir::new().unwrap();
        let mut last = SyncState::Idle;
        let err = run_observed(&BrokenSource, tmp.path(), SyncOptions::default(), |event| {
            if let SyncEvent::State(state) = event {
                last = state;
            }
        })
        .unwrap_err();

        assert!(matches!(err, SyncError::Source(_)));
        assert_eq!(last, SyncState::Failed);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_mirror_root_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = run(
            &StaticSource(json!([])),
            &tmp.path().join("absent"),
            SyncOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::MirrorRoot { .. }));
    }

    #[test]
    fn report_counts_changes() {
        let tmp = TempDir::new().unwrap();
        let source = StaticSource(json!([button(true)]));
        let first = run(&source, tmp.path(), SyncOptions::default()).unwrap();
        assert_eq!(first.unchanged(), 0);

        let second = run(&source, tmp.path(), SyncOptions::default()).unwrap();
        assert_eq!(second.changed(), 0);
        assert_eq!(second.writes.len(), first.writes.len());
    }
}
