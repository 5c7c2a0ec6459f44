//! Fleetscope Store - SQLite persistence
//!
//! Provides:
//! - Connection helpers and embedded, checksummed migrations
//! - Label store (categories, values, edges, edge labels)
//! - Repositories for projects, applications, data streams and
//!   data-driver configurations and streams
//! - The binding store for materialized service-domain bindings

pub mod binding;
pub mod db;
pub mod errors;
pub mod lookup;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use binding::{ServiceDomainBindingService, SqliteBindingStore};
pub use errors::Result;
pub use lookup::SqliteProjectLookup;
pub use repo::{ConfigRepo, EntityRepo, LabelRepo, ProjectRepo, StreamRepo};
