//! JSON-file descriptor source, for offline runs and fixtures.

use std::path::{Path, PathBuf};

use tessera_core::{ComponentDescriptor, SharedContext};

use crate::error::{io_err, SourceError};
use crate::{parse_descriptors, DescriptorSource};

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DescriptorSource for FileSource {
    fn fetch(&self) -> Result<Vec<ComponentDescriptor>, SourceError> {
        if !self.path.exists() {
            return Err(SourceError::NotFound {
                path: self.path.clone(),
            });
        }
        let payload = std::fs::read(&self.path).map_err(|e| io_err(&self.path, e))?;
        parse_descriptors(&self.path.to_string_lossy(), &payload)
    }

    fn identity(&self) -> SharedContext {
        let resolved = self.path.canonicalize().unwrap_or_else(|_| self.path.clone());
        SharedContext {
            source: resolved.to_string_lossy().into_owned(),
            source_kind: "file".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = FileSource::new(tmp.path().join("none.json"))
            .fetch()
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[test]
    fn reads_descriptors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("descriptors.json");
        std::fs::write(
            &path,
            r#"[{"name":"A","valid":false,"extension":"html","template":""}]"#,
        )
        .unwrap();
        let descriptors = FileSource::new(&path).fetch().unwrap();
        assert_eq!(descriptors.len(), 1);
        assert!(!descriptors[0].valid);
    }
}
