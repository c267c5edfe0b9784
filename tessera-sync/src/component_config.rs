//! Config merger: fold one descriptor's variant into the component record
//! at `<componentDir>/<slug>.config.json`.
//!
//! Identity fields (`title`, `status`, `context.type`) are refreshed only by
//! the default variant. Other variants in the record are never touched
//! except for their `order`. The preview reference is kept only while the
//! preview template is written in the current pass.

use std::path::Path;

use serde_json::Value;

use tessera_core::{layout, ComponentConfig, ComponentDescriptor, ResolvedPath, VariantRecord};

use crate::error::SyncError;
use crate::session::{manifest_key, SyncSession};
use crate::store::{to_document, Document};

/// Top-level keys owned by [`ComponentConfig`].
const RECORD_KEYS: &[&str] = &["title", "status", "context", "preview", "variants"];

/// Merge `descriptor` into its component record and persist it. Writes the
/// README for a default variant carrying a `notice`.
pub fn merge_component_config(
    session: &mut SyncSession,
    descriptor: &ComponentDescriptor,
    resolved: &ResolvedPath,
) -> Result<ComponentConfig, SyncError> {
    let component_dir = resolved.component_dir();
    let config_path = component_dir.join(layout::config_file_name(resolved.component_slug()));

    let document = session.load_document(&config_path)?;
    let mut record = component_record(&config_path, descriptor, document);

    if descriptor.is_default_variant() {
        record.apply_identity(descriptor);
    }
    if descriptor.preview.is_some() {
        record.preview = Some(resolved.preview_reference());
    } else if !session.written().contains(&preview_key(session, resolved)) {
        record.preview = None;
    }
    record.upsert_variant(VariantRecord::from_descriptor(descriptor));

    session.write_document(&config_path, to_document(&record)?)?;

    if descriptor.is_default_variant() {
        if let Some(notice) = &descriptor.notice {
            session.write_file(&component_dir.join(layout::README_FILE), notice.as_bytes())?;
        }
    }

    Ok(record)
}

fn preview_key(session: &SyncSession, resolved: &ResolvedPath) -> String {
    let file = layout::preview_file_name(
        resolved.component_slug(),
        &session.options().preview_extension,
    );
    manifest_key(&resolved.parent_dir().join(file))
}

/// Typed record from a document. A document without the record's keys
/// (first encounter, or only the directory `prefix` so far) seeds a fresh
/// record; one that has them but does not parse is recovered the same way,
/// with a warning.
fn component_record(
    path: &Path,
    descriptor: &ComponentDescriptor,
    document: Document,
) -> ComponentConfig {
    let has_record_keys = RECORD_KEYS.iter().any(|k| document.contains_key(*k));
    if has_record_keys {
        match serde_json::from_value::<ComponentConfig>(Value::Object(document.clone())) {
            Ok(record) => return record,
            Err(e) => tracing::warn!(
                "component config {} is unreadable ({e}); starting from a fresh record",
                path.display()
            ),
        }
    }

    let extra = document
        .into_iter()
        .filter(|(k, _)| !RECORD_KEYS.contains(&k.as_str()))
        .collect();
    ComponentConfig::seed(descriptor, extra)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
