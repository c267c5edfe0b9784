//! File names inside the mirror root: pure, no I/O.
//!
//! ```text
//! <mirror_root>/
//!   components.config.json          shared context (source identity)
//!   components.files.json           write manifest
//!   <NN-collection>/
//!     <collection>.config.json      directory config record
//!     _<slug>-preview.<ext>         preview template
//!     <slug>/
//!       <slug>[--<variant>].<ext>   template
//!       <slug>.config.json          component config record
//!       README.md                   notice (default variant only)
//! ```

use crate::error::PathError;

/// Shared context file at the mirror root.
pub const SHARED_CONTEXT_FILE: &str = "components.config.json";

/// Write manifest at the mirror root.
pub const MANIFEST_FILE: &str = "components.files.json";

pub const README_FILE: &str = "README.md";

pub const DEFAULT_PREVIEW_EXTENSION: &str = "html";

/// Accept an extension made of `[A-Za-z0-9._-]` that is neither empty nor
/// contains `..`. Anything else could leave the component directory.
pub fn check_extension(extension: Option<&str>) -> Result<&str, PathError> {
    match extension {
        Some(ext)
            if !ext.is_empty()
                && !ext.contains("..")
                && ext
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) =>
        {
            Ok(ext)
        }
        other => Err(PathError::InvalidExtension {
            extension: other.unwrap_or_default().to_owned(),
        }),
    }
}

/// `<slug>.config.json`: used for both collection and component records.
pub fn config_file_name(slug: &str) -> String {
    format!("{slug}.config.json")
}

/// `<slug>.<ext>` or `<slug>--<variant>.<ext>`.
pub fn template_file_name(slug: &str, variant: Option<&str>, extension: &str) -> String {
    match variant {
        Some(variant) => format!("{slug}--{variant}.{extension}"),
        None => format!("{slug}.{extension}"),
    }
}

/// `_<slug>-preview.<ext>`, placed in the component's parent directory.
pub fn preview_file_name(slug: &str, extension: &str) -> String {
    format!("_{slug}-preview.{extension}")
}
