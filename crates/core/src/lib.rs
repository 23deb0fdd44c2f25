//! Document engine for a small-business page builder.
//!
//! - [`document`]: the site document model, section catalog, templates,
//!   schema migration and variant dispatch.
//! - [`mutation`]: the editor. Every edit produces a new document snapshot
//!   and is undoable.
//! - [`events`]: broadcast bus carrying editor and save notifications.
//! - [`sync`]: debounced, single-flight autosave over a pluggable transport.

pub mod document;
pub mod events;
pub mod mutation;
pub mod sync;

pub use document::migrate::{ensure_latest, MigrationError};
pub use document::model::Document;
pub use document::section::{Section, SectionData, SectionType};
pub use mutation::{Editor, Mutation, MutationOutcome, SharedEditor};
