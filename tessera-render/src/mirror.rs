//! Reading rendered inputs back out of a synchronized mirror.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tessera_core::layout::{self, SHARED_CONTEXT_FILE};
use tessera_core::slug::slugify;
use tessera_core::types::DEFAULT_VARIANT;
use tessera_core::{ComponentConfig, SharedContext, SharedContextFile, VariantRecord};

use crate::context::build_context;
use crate::engine::RenderRequest;
use crate::error::{io_err, RenderError};

/// One component variant as found in a mirror directory.
#[derive(Debug, Clone)]
pub struct MirroredComponent {
    pub dir: PathBuf,
    pub slug: String,
    pub config: ComponentConfig,
    pub variant: VariantRecord,
    pub template_path: PathBuf,
    pub template: String,
}

impl MirroredComponent {
    /// Render request for this variant, layered over the mirror's shared
    /// context when one is given.
    pub fn request(&self, shared: Option<&SharedContext>) -> Result<RenderRequest, RenderError> {
        Ok(RenderRequest {
            component: self.dir.to_string_lossy().into_owned(),
            template: self.template.clone(),
            context: build_context(shared, &self.config, &self.variant)?,
        })
    }

    /// Content of the component's preview template, if its record names one.
    pub fn preview(&self, extension: &str) -> Result<Option<String>, RenderError> {
        if self.config.preview.is_none() {
            return Ok(None);
        }
        let Some(parent) = self.dir.parent() else {
            return Ok(None);
        };
        let path = parent.join(layout::preview_file_name(&self.slug, extension));
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("preview {} referenced but missing", path.display());
                Ok(None)
            }
            Err(e) => Err(io_err(&path, e)),
        }
    }
}

/// Load the component in `dir` and pick `variant` (the default variant when
/// `None`). Variant names match exactly or by slug.
pub fn load_component(dir: &Path, variant: Option<&str>) -> Result<MirroredComponent, RenderError> {
    let slug = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let record_path = dir.join(layout::config_file_name(&slug));
    let bytes = match std::fs::read(&record_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RenderError::MissingRecord { path: record_path })
        }
        Err(e) => return Err(io_err(&record_path, e)),
    };
    let config: ComponentConfig = serde_json::from_slice(&bytes)?;

    let wanted = variant.unwrap_or(DEFAULT_VARIANT);
    let record = config
        .variants
        .iter()
        .find(|v| v.name == wanted || slugify(&v.name) == slugify(wanted))
        .cloned()
        .ok_or_else(|| RenderError::MissingVariant {
            name: wanted.to_owned(),
        })?;

    let stem = if record.name == DEFAULT_VARIANT {
        slug.clone()
    } else {
        format!("{slug}--{}", slugify(&record.name))
    };
    let template_path = find_template(dir, &stem)?.ok_or_else(|| RenderError::MissingTemplate {
        dir: dir.to_path_buf(),
        variant: record.name.clone(),
    })?;
    let template =
        std::fs::read_to_string(&template_path).map_err(|e| io_err(&template_path, e))?;

    Ok(MirroredComponent {
        dir: dir.to_path_buf(),
        slug,
        config,
        variant: record,
        template_path,
        template,
    })
}

/// Source identity recorded at the mirror root, if the mirror has one.
pub fn load_shared(root: &Path) -> Result<Option<SharedContext>, RenderError> {
    let path = root.join(SHARED_CONTEXT_FILE);
    match std::fs::read(&path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice::<SharedContextFile>(&bytes)?.context)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(&path, e)),
    }
}

fn find_template(dir: &Path, stem: &str) -> Result<Option<PathBuf>, RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut matches = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if path.is_file() && path.file_stem().and_then(|s| s.to_str()) == Some(stem) {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches.into_iter().next())
}
