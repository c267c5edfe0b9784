//! Pass-scoped cache of config JSON documents.
//!
//! The first read of a config file in a pass goes to disk; every later read
//! in the same pass is served from memory, including documents written by
//! earlier descriptors. A file that is missing, unparsable or not a JSON
//! object is treated as an empty document (config corruption recovery): its
//! previous content is lost when the record is rewritten.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{io_err, SyncError};

/// A config file's top-level JSON object.
pub type Document = Map<String, Value>;

#[derive(Debug, Default)]
pub struct ConfigStore {
    documents: HashMap<PathBuf, Document>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document at `path`, from the pass cache or from disk.
    pub fn load(&mut self, path: &Path) -> Result<Document, SyncError> {
        if let Some(document) = self.documents.get(path) {
            return Ok(document.clone());
        }
        let document = read_document(path)?;
        self.documents.insert(path.to_path_buf(), document.clone());
        Ok(document)
    }

    /// Record `document` as the current content of `path`.
    pub fn update(&mut self, path: &Path, document: Document) {
        self.documents.insert(path.to_path_buf(), document);
    }

    /// `true` once `path` has been read or written in this pass.
    pub fn is_cached(&self, path: &Path) -> bool {
        self.documents.contains_key(path)
    }
}

/// Serialize a record into a document. Object keys come out sorted, so the
/// bytes do not depend on which writer touched the file last.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, SyncError> {
    match sorted(serde_json::to_value(record)?) {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert("value".to_owned(), other);
            Ok(map)
        }
    }
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Pretty-printed bytes of a document.
pub fn render_document(document: &Document) -> Result<Vec<u8>, SyncError> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn read_document(path: &Path) -> Result<Document, SyncError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
        Err(e) => return Err(io_err(path, e)),
    };
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            tracing::warn!(
                "config {} is not a JSON object; starting from a fresh record",
                path.display()
            );
            Ok(Document::new())
        }
        Err(e) => {
            tracing::warn!(
                "config {} is corrupt ({e}); starting from a fresh record",
                path.display()
            );
            Ok(Document::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_document() {
        let tmp = TempDir::new().unwrap();
        let mut store = ConfigStore::new();
        let doc = store.load(&tmp.path().join("a.config.json")).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn corrupt_and_non_object_files_recover_as_empty() {
        let tmp = TempDir::new().unwrap();
        let corrupt = tmp.path().join("corrupt.config.json");
        let array = tmp.path().join("array.config.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        std::fs::write(&array, "[1, 2]").unwrap();

        let mut store = ConfigStore::new();
        assert!(store.load(&corrupt).unwrap().is_empty());
        assert!(store.load(&array).unwrap().is_empty());
    }

    #[test]
    fn cache_wins_over_disk_within_a_pass() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.config.json");
        std::fs::write(&path, r#"{"prefix": "disk"}"#).unwrap();

        let mut store = ConfigStore::new();
        assert_eq!(store.load(&path).unwrap()["prefix"], json!("disk"));

        std::fs::write(&path, r#"{"prefix": "changed on disk"}"#).unwrap();
        assert_eq!(store.load(&path).unwrap()["prefix"], json!("disk"));

        let mut doc = Document::new();
        doc.insert("prefix".into(), json!("memory"));
        store.update(&path, doc);
        assert_eq!(store.load(&path).unwrap()["prefix"], json!("memory"));
        assert!(store.is_cached(&path));
    }

    #[test]
    fn rendered_documents_have_sorted_keys() {
        let doc = to_document(&json!({"zeta": 1, "alpha": {"b": 2, "a": 1}})).unwrap();
        let text = String::from_utf8(render_document(&doc).unwrap()).unwrap();
        assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
        assert!(text.ends_with("}\n"));
    }
}
