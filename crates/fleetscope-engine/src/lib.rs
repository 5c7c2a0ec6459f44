//! Fleetscope Engine - Orchestration layer
//!
//! Coordinates the pure resolvers in `fleetscope-core` with persistence in
//! `fleetscope-store`: every read recomputes scope from a fresh label
//! snapshot, and project updates fan out to materialized bindings inside
//! the same transaction.

pub mod commands;
pub mod notify;

pub use notify::{ChangeQueue, ChangeReceiver, QueueStats};
