//! Category and edge label management
//!
//! Seeds categories and edges and relabels edges. A relabel never touches
//! applications or data streams: their scope is recomputed on the next read.

#![allow(clippy::result_large_err)]

use fleetscope_core::core_types::TenantScope;
use fleetscope_core::rules::validate_category;
use fleetscope_core::{Category, Edge, EdgeLabelSnapshot, ExError, Labels, ScopeError};
use fleetscope_store::errors::{from_rusqlite, Result};
use fleetscope_store::LabelRepo;
use rusqlite::Connection;

use super::{require_infra_admin, run_op};

/// Create or update a category after validating it
///
/// # Errors
/// * `PermissionDenied` - caller is not an infra admin
/// * `InvalidInput` - category failed validation
pub fn category_upsert(scope: &TenantScope, conn: &Connection, category: Category) -> Result<Category> {
    run_op("category_upsert", scope, || {
        require_infra_admin(scope)?;

        let mut category = category;
        category.tenant_id = scope.tenant_id().to_string();
        validate_category(&mut category)?;

        if let Some(existing) = LabelRepo::get_category(conn, &category.id)? {
            if existing.tenant_id != category.tenant_id {
                return Err(ScopeError::CategoryNotFound {
                    category_id: category.id,
                }
                .into());
            }
        }

        LabelRepo::upsert_category(conn, &category)?;
        Ok(category)
    })
}

pub fn category_list(scope: &TenantScope, conn: &Connection) -> Result<Vec<Category>> {
    run_op("category_list", scope, || {
        LabelRepo::list_categories(conn, scope.tenant_id())
    })
}

/// Create or update an edge and replace its labels
///
/// # Errors
/// * `PermissionDenied` - caller is not an infra admin
/// * `NotFound` - a label references an unknown category value
pub fn edge_upsert(scope: &TenantScope, conn: &mut Connection, edge: Edge) -> Result<Edge> {
    run_op("edge_upsert", scope, || {
        require_infra_admin(scope)?;

        let mut edge = edge;
        edge.tenant_id = scope.tenant_id().to_string();
        if let Some(existing) = LabelRepo::get_edge(conn, &edge.id)? {
            if existing.tenant_id != edge.tenant_id {
                return Err(edge_not_found(&edge.id));
            }
        }

        let tx = conn.transaction().map_err(from_rusqlite)?;
        LabelRepo::upsert_edge(&tx, &edge)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(edge)
    })
}

/// Replace the labels of an existing edge
pub fn edge_set_labels(
    scope: &TenantScope,
    conn: &mut Connection,
    edge_id: &str,
    labels: Labels,
) -> Result<()> {
    run_op("edge_set_labels", scope, || {
        require_infra_admin(scope)?;

        match LabelRepo::get_edge(conn, edge_id)? {
            Some(edge) if edge.tenant_id == scope.tenant_id() => {}
            _ => return Err(edge_not_found(edge_id)),
        }

        let tx = conn.transaction().map_err(from_rusqlite)?;
        LabelRepo::set_edge_labels(&tx, edge_id, &labels)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(())
    })
}

/// Current labels of every edge in the caller's tenant
pub fn label_snapshot(scope: &TenantScope, conn: &Connection) -> Result<EdgeLabelSnapshot> {
    run_op("label_snapshot", scope, || {
        LabelRepo::label_snapshot(conn, scope.tenant_id())
    })
}

fn edge_not_found(edge_id: &str) -> ExError {
    ScopeError::EdgeNotFound {
        edge_id: edge_id.to_string(),
    }
    .into()
}
