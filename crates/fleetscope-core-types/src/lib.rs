//! Core types shared across fleetscope layers
//!
//! This crate provides the foundational types used by the resolvers, the
//! store and the engine:
//!
//! - **Correlation types**: RequestId
//! - **Caller context**: TenantScope, Role
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod tenant;

pub use correlation::RequestId;
pub use tenant::{Role, TenantScope};
