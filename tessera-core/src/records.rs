//! Persisted config records.
//!
//! Every record keeps unknown keys in a flattened `extra` map so hand edits
//! and keys owned by another writer survive a rewrite. The component
//! directory's `<slug>.config.json` is written by both the collection
//! initializer (which owns `prefix`) and the config merger (which owns the
//! rest); each side sees the other's keys as `extra`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{ComponentDescriptor, ComponentRequest};

// ---------------------------------------------------------------------------
// Directory config
// ---------------------------------------------------------------------------

/// One record per directory level.
///
/// `prefix` is derived state and is overwritten on every pass. `label` is
/// kept unless the source supplies a new one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DirectoryConfig {
    /// Stamp derived state onto the record.
    pub fn stamp(&mut self, prefix: &str, label: Option<&str>) {
        self.prefix = prefix.to_owned();
        if let Some(label) = label {
            self.label = Some(label.to_owned());
        }
    }
}

// ---------------------------------------------------------------------------
// Component config
// ---------------------------------------------------------------------------

/// Component-level context shared by all variants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentContext {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-variant context handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantContext {
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub request: Value,
    #[serde(default)]
    pub component: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub order: usize,
    #[serde(default)]
    pub context: VariantContext,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VariantRecord {
    /// Build a fresh variant record from a descriptor. `order` is assigned
    /// later by [`ComponentConfig::reorder_variants`].
    pub fn from_descriptor(descriptor: &ComponentDescriptor) -> Self {
        let request = descriptor
            .request
            .as_ref()
            .map(request_value)
            .unwrap_or(Value::Null);
        Self {
            name: descriptor.variant_name().to_owned(),
            label: descriptor.variant_label().to_owned(),
            order: 0,
            context: VariantContext {
                config: descriptor.config.clone().unwrap_or(Value::Null),
                parameters: descriptor.parameters.clone().unwrap_or_default(),
                request,
                component: descriptor.class.clone(),
            },
            extra: Map::new(),
        }
    }
}

fn request_value(request: &ComponentRequest) -> Value {
    serde_json::to_value(request).unwrap_or(Value::Null)
}

/// One record per component, shared by all of its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub context: ComponentContext,
    /// Reference id of the preview template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    pub variants: Vec<VariantRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentConfig {
    /// Fresh record seeded from a descriptor, carrying over `extra` keys
    /// already present in the document (e.g. the directory `prefix`).
    pub fn seed(descriptor: &ComponentDescriptor, extra: Map<String, Value>) -> Self {
        Self {
            title: descriptor.name.clone(),
            status: descriptor.status.clone(),
            context: ComponentContext {
                kind: descriptor.kind.clone(),
                component: Some(descriptor.class.clone()).filter(|c| !c.is_empty()),
                config: descriptor.config.clone(),
                resources: descriptor.resources.clone(),
                extra: Map::new(),
            },
            preview: None,
            variants: Vec::new(),
            extra,
        }
    }

    /// Refresh identity fields. Callers invoke this for the default variant only.
    pub fn apply_identity(&mut self, descriptor: &ComponentDescriptor) {
        self.title = descriptor.name.clone();
        self.status = descriptor.status.clone();
        self.context.kind = descriptor.kind.clone();
    }

    /// Replace the variant with the same name in place, or append it.
    /// Sibling variants are untouched. Re-sorts and renumbers afterwards.
    pub fn upsert_variant(&mut self, variant: VariantRecord) {
        match self.variants.iter_mut().find(|v| v.name == variant.name) {
            Some(existing) => *existing = variant,
            None => self.variants.push(variant),
        }
        let mut seen = HashSet::new();
        self.variants.retain(|v| seen.insert(v.name.clone()));
        self.reorder_variants();
    }

    /// Stable sort by case-insensitive label, then `order = 0..N-1`.
    pub fn reorder_variants(&mut self) {
        self.variants.sort_by_cached_key(|v| v.label.to_lowercase());
        for (order, variant) in self.variants.iter_mut().enumerate() {
            variant.order = order;
        }
    }

    pub fn variant(&self, name: &str) -> Option<&VariantRecord> {
        self.variants.iter().find(|v| v.name == name)
    }
}

// ---------------------------------------------------------------------------
// Shared context
// ---------------------------------------------------------------------------

/// Identity of the descriptor source, for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedContext {
    /// Resolved instance path or URL.
    pub source: String,
    #[serde(rename = "sourceKind")]
    pub source_kind: String,
}

/// `components.config.json` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedContextFile {
    pub context: SharedContext,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
