//! # tessera-render
//!
//! Turns a mirrored component variant into markup. The sync engine only
//! produces the inputs (template string, component record, shared context);
//! this crate assembles the render context and hands it to an engine.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tessera_render::{load_component, load_shared, RenderEngine, TeraEngine};
//!
//! fn render_button(root: &Path) -> Result<String, tessera_render::RenderError> {
//!     let shared = load_shared(root)?;
//!     let component = load_component(&root.join("atoms/button"), None)?;
//!     TeraEngine::new().render(&component.request(shared.as_ref())?)
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod mirror;

pub use context::build_context;
pub use engine::{render_preview, CliEngine, RenderEngine, RenderRequest, TeraEngine};
pub use error::RenderError;
pub use mirror::{load_component, load_shared, MirroredComponent};
