//! # tessera-sync
//!
//! Component-tree synchronization: mirror a descriptor list into a directory
//! tree, merge per-directory and per-component config records idempotently,
//! and reconcile the files written this pass against the previous pass.
//!
//! Call [`pipeline::run`] with a [`tessera_source::DescriptorSource`] and the
//! mirror root. Lower-level steps ([`collection`], [`component_config`],
//! [`registrar`], [`manifest`]) operate on an explicit [`SyncSession`].

pub mod collection;
pub mod component_config;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod registrar;
pub mod session;
pub mod store;
pub mod writer;

pub use error::{RegistrationStep, SyncError};
pub use manifest::ReconcileOutcome;
pub use pipeline::{run, run_observed, SyncEvent, SyncOptions, SyncReport, SyncState};
pub use session::SyncSession;
pub use writer::WriteResult;
