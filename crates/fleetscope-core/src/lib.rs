//! Fleetscope Core - edge membership resolution
//!
//! Pure domain layer for deciding which edges (service domains) a workload
//! applies to:
//! - Selector matching over edge labels
//! - Project and entity scope resolution
//! - Cleanup of materialized data-driver bindings after a project changes
//! - Write-time validation of projects, entities and categories
//! - Structured errors and the logging facility shared by every crate
//!
//! Nothing here performs I/O. Callers load projects and an
//! [`EdgeLabelSnapshot`] and pass them in.

pub mod cleanup;
pub mod errors;
pub mod events;
pub mod logging_facility;
pub mod lookup;
pub mod model;
pub mod rules;
pub mod scope;
pub mod selector;

pub use fleetscope_core_types as core_types;

// Re-export commonly used types
pub use cleanup::cleanup_binding;
pub use errors::{ExError, ExErrorKind, ExResult, Result, ScopeError};
pub use events::{ChangeKind, ChangeSink, Delivery, EntityEvent, NoopChangeSink};
pub use lookup::{authorized_project, ProjectLookup, StaticProjectLookup};
pub use model::{
    BindingMode, BindingOwner, Category, CategoryValue, DataDriverConfig, DataDriverStream, Edge,
    EdgeLabelSnapshot, EdgeSelectorType, EntityKind, EntityState, Project, ScopedEntity,
    ServiceDomainBinding, StreamDirection,
};
pub use scope::{resolve_entity_scope, resolve_entity_scope_checked, resolve_project_scope, EntityScope};
pub use selector::{Labels, Selector};
