#![allow(clippy::result_large_err)]

use fleetscope_core::{DataDriverStream, ServiceDomainBinding, StreamDirection};
use rusqlite::{Connection, OptionalExtension};

use super::ensure_owned;
use crate::binding::SqliteBindingStore;
use crate::errors::{corrupt_row, from_rusqlite, Result};

/// Data-driver stream rows
///
/// Like configurations, the binding lives in the binding store and streams
/// come back from here with an empty one. The direction column is written
/// on insert only.
pub struct StreamRepo;

impl StreamRepo {
    /// # Errors
    /// * `ConstraintViolation` - the ID belongs to another tenant's stream
    pub fn persist_stream(conn: &Connection, stream: &DataDriverStream) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let changed = conn
            .execute(
                "INSERT INTO data_driver_streams
                    (id, tenant_id, project_id, name, direction, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    updated_at = excluded.updated_at
                 WHERE data_driver_streams.tenant_id = excluded.tenant_id",
                rusqlite::params![
                    stream.id,
                    stream.tenant_id,
                    stream.project_id,
                    stream.name,
                    stream.direction.as_str(),
                    now
                ],
            )
            .map_err(from_rusqlite)?;
        ensure_owned(changed, "data_driver_streams", &stream.id)
    }

    pub fn find_stream(conn: &Connection, tenant_id: &str, stream_id: &str) -> Result<Option<DataDriverStream>> {
        let row = conn
            .query_row(
                "SELECT id, tenant_id, project_id, name, direction FROM data_driver_streams
                 WHERE tenant_id = ?1 AND id = ?2",
                [tenant_id, stream_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(from_rusqlite)?;

        let Some((id, tenant_id, project_id, name, direction)) = row else {
            return Ok(None);
        };
        let direction: StreamDirection = direction
            .parse()
            .map_err(|e| corrupt_row("data_driver_streams", e))?;
        Ok(Some(
            DataDriverStream::new(id, tenant_id, project_id, direction, ServiceDomainBinding::default())
                .with_name(name),
        ))
    }

    /// IDs of every stream bound to a project, sorted
    pub fn stream_ids_for_project(conn: &Connection, project_id: &str) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT id FROM data_driver_streams WHERE project_id = ?1 ORDER BY id")
            .map_err(from_rusqlite)?;
        let ids = stmt
            .query_map([project_id], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(ids)
    }

    /// Delete a stream row together with its binding rows
    pub fn delete_stream(conn: &Connection, stream_id: &str) -> Result<bool> {
        SqliteBindingStore::delete_rows(conn, stream_id)?;
        let deleted = conn
            .execute("DELETE FROM data_driver_streams WHERE id = ?1", [stream_id])
            .map_err(from_rusqlite)?;
        Ok(deleted > 0)
    }
}
