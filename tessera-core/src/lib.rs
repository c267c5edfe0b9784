//! Tessera core library: component descriptors, persisted records, path
//! resolution and configuration.
//!
//! - [`types`]: the externally supplied [`ComponentDescriptor`]
//! - [`slug`]: filesystem-safe name normalization
//! - [`path`]: the path resolver ([`ResolvedPath`])
//! - [`layout`]: file names inside the mirror root
//! - [`records`]: directory / component config records
//! - [`config`]: YAML configuration ([`TesseraConfig`])

pub mod config;
pub mod error;
pub mod layout;
pub mod path;
pub mod records;
pub mod slug;
pub mod types;

pub use config::{RenderConfig, RenderEngineKind, SourceConfig, TesseraConfig};
pub use error::{ConfigError, PathError};
pub use path::{PathSegment, ResolvedPath};
pub use records::{
    ComponentConfig, ComponentContext, DirectoryConfig, SharedContext, SharedContextFile,
    VariantContext, VariantRecord,
};
pub use types::{ComponentDescriptor, ComponentRequest, LocalHint};
