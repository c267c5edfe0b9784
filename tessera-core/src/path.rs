//! Path resolver: descriptor name path to on-disk directory segments.
//!
//! Each ancestor becomes a [`PathSegment`] carrying its slug and optional
//! sort hint. The sort hint only affects the on-disk directory name
//! (`03-widgets`); prefixes, handles and reference ids are always built from
//! the bare slugs, so no numeric artifact ever leaks into them.

use std::path::PathBuf;

use crate::error::PathError;
use crate::slug::slugify;
use crate::types::{ComponentDescriptor, LocalHint};

/// Highest sort hint that still fits the two-digit directory prefix.
pub const MAX_DIRSORT: i64 = 99;

/// One directory level of a resolved component path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub slug: String,
    pub sort: Option<u8>,
    pub label: Option<String>,
}

impl PathSegment {
    /// On-disk directory name: `<NN>-<slug>` with a sort hint, `<slug>` without.
    pub fn dir_name(&self) -> String {
        match self.sort {
            Some(sort) => format!("{sort:02}-{}", self.slug),
            None => self.slug.clone(),
        }
    }
}

/// A descriptor mapped onto the mirror: ancestor collections plus the
/// component's own directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub collections: Vec<PathSegment>,
    pub component: PathSegment,
    /// Slug of the descriptor's variant, `None` for the default variant.
    pub variant: Option<String>,
}

impl ResolvedPath {
    /// Resolve a descriptor's `path`, `local` hints, `name` and `variant`.
    pub fn resolve(descriptor: &ComponentDescriptor) -> Result<Self, PathError> {
        let mut resolved = Self::from_parts(&descriptor.path, &descriptor.local, &descriptor.name)?;
        if let Some(variant) = &descriptor.variant {
            resolved.variant = Some(non_empty_slug(variant)?);
        }
        Ok(resolved)
    }

    /// Resolve ancestors zipped with their hints; missing hints mean no prefix.
    pub fn from_parts(
        ancestors: &[String],
        hints: &[LocalHint],
        name: &str,
    ) -> Result<Self, PathError> {
        let mut collections = Vec::with_capacity(ancestors.len());
        for (index, ancestor) in ancestors.iter().enumerate() {
            let hint = hints.get(index);
            collections.push(PathSegment {
                slug: non_empty_slug(ancestor)?,
                sort: hint.and_then(|h| sort_prefix(ancestor, h.dirsort)),
                label: hint.and_then(|h| h.label.clone()),
            });
        }

        let component = PathSegment {
            slug: non_empty_slug(name)?,
            sort: None,
            label: None,
        };

        Ok(Self {
            collections,
            component,
            variant: None,
        })
    }

    /// Ancestors followed by the component segment, root to leaf.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.collections.iter().chain(std::iter::once(&self.component))
    }

    /// Number of directory levels, component included.
    pub fn depth(&self) -> usize {
        self.collections.len() + 1
    }

    /// Mirror-relative directory of the first `levels` segments.
    pub fn relative_dir_at(&self, levels: usize) -> PathBuf {
        self.segments().take(levels).map(PathSegment::dir_name).collect()
    }

    /// Mirror-relative component directory.
    pub fn component_dir(&self) -> PathBuf {
        self.relative_dir_at(self.depth())
    }

    /// Mirror-relative directory holding the component directory.
    pub fn parent_dir(&self) -> PathBuf {
        self.relative_dir_at(self.collections.len())
    }

    /// Collection prefix for the first `levels` segments: slugs joined by `-`.
    pub fn prefix_at(&self, levels: usize) -> String {
        self.segments()
            .take(levels)
            .map(|s| s.slug.as_str())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Component handle: every slug joined by `-`.
    pub fn handle(&self) -> String {
        self.prefix_at(self.depth())
    }

    /// Reference id of the component's preview template: `@<handle>-preview`.
    pub fn preview_reference(&self) -> String {
        format!("@{}-preview", self.handle())
    }

    pub fn component_slug(&self) -> &str {
        &self.component.slug
    }
}

fn non_empty_slug(name: &str) -> Result<String, PathError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(PathError::EmptySegment {
            name: name.to_owned(),
        });
    }
    Ok(slug)
}

fn sort_prefix(ancestor: &str, dirsort: Option<i64>) -> Option<u8> {
    let value = dirsort?;
    match u8::try_from(value) {
        Ok(sort) if i64::from(sort) <= MAX_DIRSORT => Some(sort),
        _ => {
            tracing::warn!("ignoring out-of-range dirsort {value} for {ancestor:?}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
