#![allow(clippy::result_large_err)]

use fleetscope_core::{DataDriverConfig, ServiceDomainBinding};
use rusqlite::{Connection, OptionalExtension, Row};

use super::{ensure_owned, id_taken};
use crate::binding::SqliteBindingStore;
use crate::errors::{from_rusqlite, Result};

/// Tables whose rows own a binding; binding rows are keyed by their IDs
pub(crate) const BINDING_OWNER_TABLES: &[&str] = &["data_driver_configs", "data_driver_streams"];

/// Data-driver configuration rows
///
/// The binding is not stored here; see
/// [`SqliteBindingStore`](crate::binding::SqliteBindingStore). Configs
/// returned by this repo carry an empty binding.
pub struct ConfigRepo;

impl ConfigRepo {
    /// # Errors
    /// * `ConstraintViolation` - the ID belongs to another tenant's config
    pub fn persist_config(conn: &Connection, config: &DataDriverConfig) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let changed = conn
            .execute(
                "INSERT INTO data_driver_configs (id, tenant_id, project_id, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    updated_at = excluded.updated_at
                 WHERE data_driver_configs.tenant_id = excluded.tenant_id",
                rusqlite::params![config.id, config.tenant_id, config.project_id, config.name, now],
            )
            .map_err(from_rusqlite)?;
        ensure_owned(changed, "data_driver_configs", &config.id)
    }

    /// Whether the ID is held by any configuration or stream, in any tenant
    ///
    /// Both share the binding tables, so one ID space covers them.
    pub fn binding_owner_exists(conn: &Connection, id: &str) -> Result<bool> {
        id_taken(conn, BINDING_OWNER_TABLES, id)
    }

    pub fn find_config(conn: &Connection, tenant_id: &str, config_id: &str) -> Result<Option<DataDriverConfig>> {
        conn.query_row(
            "SELECT id, tenant_id, project_id, name FROM data_driver_configs
             WHERE tenant_id = ?1 AND id = ?2",
            [tenant_id, config_id],
            config_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// IDs of every configuration bound to a project, sorted
    pub fn config_ids_for_project(conn: &Connection, project_id: &str) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT id FROM data_driver_configs WHERE project_id = ?1 ORDER BY id")
            .map_err(from_rusqlite)?;
        let ids = stmt
            .query_map([project_id], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(ids)
    }

    /// Delete a configuration row together with its binding rows
    pub fn delete_config(conn: &Connection, config_id: &str) -> Result<bool> {
        SqliteBindingStore::delete_rows(conn, config_id)?;
        let deleted = conn
            .execute("DELETE FROM data_driver_configs WHERE id = ?1", [config_id])
            .map_err(from_rusqlite)?;
        Ok(deleted > 0)
    }
}

fn config_from_row(row: &Row<'_>) -> rusqlite::Result<DataDriverConfig> {
    Ok(DataDriverConfig::new(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        ServiceDomainBinding::default(),
    )
    .with_name(row.get::<_, String>(3)?))
}
