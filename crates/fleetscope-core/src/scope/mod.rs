//! Scope resolution
//!
//! Pure functions that turn a project's edge-selection policy, plus an
//! entity's own scoping fields, into a concrete set of edge IDs. Callers
//! fetch the project and an [`EdgeLabelSnapshot`](crate::model::EdgeLabelSnapshot)
//! first; nothing here performs I/O or keeps state between calls.

pub mod entity;
pub mod project;

pub use entity::{resolve_entity_scope, resolve_entity_scope_checked, EntityScope};
pub use project::resolve_project_scope;
