//! Repositories persisting the domain model to SQLite
//!
//! Every function takes a `&Connection`. Pass a `&Transaction` (it derefs
//! to a connection) to make a sequence of calls atomic.

pub mod config_repo;
pub mod entity_repo;
pub mod label_repo;
pub mod project_repo;
pub mod stream_repo;

pub use config_repo::ConfigRepo;
pub use entity_repo::EntityRepo;
pub use label_repo::LabelRepo;
pub use project_repo::ProjectRepo;
pub use stream_repo::StreamRepo;

use chrono::{DateTime, Utc};
use fleetscope_core::{CategoryValue, ExError, ExErrorKind, Selector};
use rusqlite::{Connection, OptionalExtension};

use crate::errors::{from_rusqlite, Result};

pub(crate) fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Check the row count of a tenant-guarded upsert
///
/// Upserts only update a conflicting row of the same tenant, so zero rows
/// changed means `id` is held by another tenant.
pub(crate) fn ensure_owned(changed: usize, table: &str, id: &str) -> Result<()> {
    if changed > 0 {
        return Ok(());
    }
    Err(ExError::new(ExErrorKind::ConstraintViolation)
        .with_op(format!("persist_{table}"))
        .with_entity_id(id.to_string())
        .with_message(format!("id {id} is already in use in {table}")))
}

/// Whether any of `tables` has a row with this primary key, in any tenant
pub(crate) fn id_taken(conn: &Connection, tables: &[&str], id: &str) -> Result<bool> {
    for table in tables {
        let found = conn
            .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| Ok(()))
            .optional()
            .map_err(from_rusqlite)?;
        if found.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}
/// Load a selector stored as category-value references
///
/// `table` must have `key_column` and `category_value_id` columns.
pub(crate) fn load_selector(
    conn: &Connection,
    table: &str,
    key_column: &str,
    key: &str,
) -> Result<Selector> {
    let sql = format!(
        "SELECT cv.category_id, cv.value
         FROM {table} s JOIN category_values cv ON cv.id = s.category_value_id
         WHERE s.{key_column} = ?1
         ORDER BY cv.category_id, cv.value"
    );
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
    let terms = stmt
        .query_map([key], |row| Ok(CategoryValue::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(terms.into_iter().collect())
}

/// Replace the stored selector rows for `key`
///
/// Every term is resolved to a category value of `tenant_id` first, so an
/// unknown or foreign category fails before anything is inserted for that
/// term.
pub(crate) fn replace_selector(
    conn: &Connection,
    tenant_id: &str,
    table: &str,
    key_column: &str,
    key: &str,
    selector: &Selector,
) -> Result<()> {
    conn.execute(&format!("DELETE FROM {table} WHERE {key_column} = ?1"), [key])
        .map_err(from_rusqlite)?;

    let insert = format!("INSERT INTO {table} ({key_column}, category_value_id) VALUES (?1, ?2)");
    for (category_id, value) in selector.iter() {
        let value_id = LabelRepo::resolve_category_value(conn, tenant_id, category_id, value)?;
        conn.execute(&insert, rusqlite::params![key, value_id])
            .map_err(from_rusqlite)?;
    }
    Ok(())
}

pub(crate) fn load_selector_for_binding(conn: &Connection, binding_id: &str) -> Result<Selector> {
    load_selector(conn, "data_driver_edge_selectors", "params_id", binding_id)
}
