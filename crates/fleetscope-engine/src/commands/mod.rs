//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! Every public command logs its own lifecycle:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Core and store only use `tracing::debug!()` for internal details.
//!
//! Change events are published after the transaction commits.

#![allow(clippy::result_large_err)]

pub mod data_driver;
pub mod entity;
pub mod labels;
pub mod project;

use std::time::Instant;

use fleetscope_core::core_types::{Role, TenantScope};
use fleetscope_core::{log_op_end, log_op_error, log_op_start, ExError, ExErrorKind};
use fleetscope_store::errors::Result;

/// Run `f` as the named operation with boundary logging
///
/// Errors leave with the operation name and the caller's request ID
/// attached when the lower layers did not set them.
pub(crate) fn run_op<T>(
    op: &'static str,
    scope: &TenantScope,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    log_op_start!(
        op,
        tenant_id = scope.tenant_id(),
        request_id = scope.request_id().as_str()
    );
    let start = Instant::now();

    match f() {
        Ok(value) => {
            log_op_end!(op, duration_ms = start.elapsed().as_millis() as u64);
            Ok(value)
        }
        Err(mut err) => {
            if err.op().is_none() {
                err = err.with_op(op);
            }
            if err.request_id().is_none() {
                err = err.with_request_id(scope.request_id().clone());
            }
            log_op_error!(
                op,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

/// Tenant-wide changes (projects, categories, edges) need an infra admin
pub(crate) fn require_infra_admin(scope: &TenantScope) -> Result<()> {
    if scope.role() != Role::InfraAdmin {
        return Err(ExError::new(ExErrorKind::PermissionDenied)
            .with_message("operation requires an infra admin"));
    }
    Ok(())
}
