//! Component descriptors as produced by the descriptor source.
//!
//! Descriptors are read-only input. Field names follow the source's JSON
//! (`type` is exposed as [`ComponentDescriptor::kind`]).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Variant name used when a descriptor carries no `variant`.
pub const DEFAULT_VARIANT: &str = "default";

// ---------------------------------------------------------------------------
// Per-level hints
// ---------------------------------------------------------------------------

/// Sort / label hint for one ancestor level, aligned positionally with
/// [`ComponentDescriptor::path`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalHint {
    /// Raw sort hint. Only `0..=99` produces a directory prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dirsort: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LocalHint {
    fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let dirsort = match map.get("dirsort") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        let label = map
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self { dirsort, label }
    }
}

/// Accepts anything for `local`; only an array yields hints.
fn lenient_hints<'de, D>(deserializer: D) -> Result<Vec<LocalHint>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().map(LocalHint::from_value).collect(),
        _ => Vec::new(),
    })
}

/// `null` reads as the type's default, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Request the rendering collaborator replays for a component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentRequest {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// One externally supplied component (or component variant) to mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ancestor names, root to parent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valid: bool,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub class: String,
    /// Template file extension. Checked at registration, so an invalid
    /// descriptor may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// README body, written for the default variant only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ComponentRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_hints")]
    pub local: Vec<LocalHint>,
}

impl ComponentDescriptor {
    /// `true` when the descriptor carries no `variant`.
    pub fn is_default_variant(&self) -> bool {
        self.variant.is_none()
    }

    /// The variant name recorded in the component config.
    pub fn variant_name(&self) -> &str {
        self.variant.as_deref().unwrap_or(DEFAULT_VARIANT)
    }

    /// Label for the variant record: `label`, then `variant`, then `name`.
    pub fn variant_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.variant.as_deref())
            .unwrap_or(&self.name)
    }

    /// Hint for ancestor level `index`, if the source supplied one.
    pub fn hint(&self, index: usize) -> Option<&LocalHint> {
        self.local.get(index)
    }
}

/// `Atoms/Button (primary)`: the human-readable name used in log output.
impl fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ancestor in &self.path {
            write!(f, "{ancestor}/")?;
        }
        f.write_str(&self.name)?;
        if let Some(variant) = &self.variant {
            write!(f, " ({variant})")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
