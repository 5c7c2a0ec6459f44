#![allow(clippy::result_large_err)]

use std::collections::BTreeSet;

use fleetscope_core::{EntityKind, EntityState, ScopedEntity};
use rusqlite::{Connection, OptionalExtension, Row};

use super::{ensure_owned, id_taken, load_selector, replace_selector, timestamp};
use crate::errors::{corrupt_row, from_rusqlite, Result};

const SELECT_ENTITY: &str =
    "SELECT id, tenant_id, project_id, kind, name, created_at, updated_at FROM scoped_entities";

/// Persistence for applications and data streams
///
/// Scope fields are stored as requested; the effective edge set is never
/// written.
pub struct EntityRepo;

impl EntityRepo {
    /// # Errors
    /// * `ConstraintViolation` - the ID belongs to another tenant or kind;
    ///   nothing is written
    pub fn persist_entity(conn: &Connection, entity: &ScopedEntity) -> Result<()> {
        let changed = conn
            .execute(
                "INSERT INTO scoped_entities (id, tenant_id, project_id, kind, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    updated_at = excluded.updated_at
                 WHERE scoped_entities.tenant_id = excluded.tenant_id
                   AND scoped_entities.kind = excluded.kind",
                rusqlite::params![
                    entity.id,
                    entity.tenant_id,
                    entity.project_id,
                    entity.kind.as_str(),
                    entity.name,
                    entity.created_at.timestamp(),
                    entity.updated_at.timestamp(),
                ],
            )
            .map_err(from_rusqlite)?;
        ensure_owned(changed, "scoped_entities", &entity.id)?;

        conn.execute("DELETE FROM scoped_entity_edges WHERE entity_id = ?1", [&entity.id])
            .map_err(from_rusqlite)?;
        let rows = entity
            .edge_ids
            .iter()
            .map(|id| (id, EntityState::Deploy))
            .chain(entity.exclude_edge_ids.iter().map(|id| (id, EntityState::Undeploy)));
        for (edge_id, state) in rows {
            conn.execute(
                "INSERT INTO scoped_entity_edges (entity_id, edge_id, state) VALUES (?1, ?2, ?3)",
                [entity.id.as_str(), edge_id.as_str(), state.as_str()],
            )
            .map_err(from_rusqlite)?;
        }

        replace_selector(
            conn,
            &entity.tenant_id,
            "scoped_entity_selectors",
            "entity_id",
            &entity.id,
            &entity.edge_selectors,
        )
    }

    /// Whether any tenant already has an entity of either kind with this ID
    pub fn id_exists(conn: &Connection, entity_id: &str) -> Result<bool> {
        id_taken(conn, &["scoped_entities"], entity_id)
    }

    pub fn find_entity(
        conn: &Connection,
        tenant_id: &str,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<Option<ScopedEntity>> {
        let sql = format!("{SELECT_ENTITY} WHERE tenant_id = ?1 AND kind = ?2 AND id = ?3");
        let row = conn
            .query_row(&sql, [tenant_id, kind.as_str(), entity_id], EntityRow::from_row)
            .optional()
            .map_err(from_rusqlite)?;

        match row {
            Some(row) => Ok(Some(Self::hydrate(conn, row)?)),
            None => Ok(None),
        }
    }

    /// Every entity of one kind in a tenant, sorted by ID
    pub fn list_entities(conn: &Connection, tenant_id: &str, kind: EntityKind) -> Result<Vec<ScopedEntity>> {
        let sql = format!("{SELECT_ENTITY} WHERE tenant_id = ?1 AND kind = ?2 ORDER BY id");
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([tenant_id, kind.as_str()], EntityRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter().map(|row| Self::hydrate(conn, row)).collect()
    }

    /// Delete an entity with its edge and selector rows
    pub fn delete_entity(conn: &Connection, kind: EntityKind, entity_id: &str) -> Result<bool> {
        conn.execute("DELETE FROM scoped_entity_edges WHERE entity_id = ?1", [entity_id])
            .map_err(from_rusqlite)?;
        conn.execute("DELETE FROM scoped_entity_selectors WHERE entity_id = ?1", [entity_id])
            .map_err(from_rusqlite)?;
        let deleted = conn
            .execute(
                "DELETE FROM scoped_entities WHERE id = ?1 AND kind = ?2",
                [entity_id, kind.as_str()],
            )
            .map_err(from_rusqlite)?;
        Ok(deleted > 0)
    }

    fn hydrate(conn: &Connection, row: EntityRow) -> Result<ScopedEntity> {
        let kind: EntityKind = row.kind.parse()?;

        let mut stmt = conn
            .prepare("SELECT edge_id, state FROM scoped_entity_edges WHERE entity_id = ?1")
            .map_err(from_rusqlite)?;
        let edge_rows = stmt
            .query_map([&row.id], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let mut edge_ids = BTreeSet::new();
        let mut exclude_edge_ids = BTreeSet::new();
        for (edge_id, state) in edge_rows {
            match state.parse::<EntityState>() {
                Ok(EntityState::Deploy) => edge_ids.insert(edge_id),
                Ok(EntityState::Undeploy) => exclude_edge_ids.insert(edge_id),
                Err(e) => return Err(corrupt_row("scoped_entity_edges", e)),
            };
        }

        let edge_selectors = load_selector(conn, "scoped_entity_selectors", "entity_id", &row.id)?;

        Ok(ScopedEntity {
            id: row.id,
            tenant_id: row.tenant_id,
            project_id: row.project_id,
            kind,
            name: row.name,
            edge_ids,
            edge_selectors,
            exclude_edge_ids,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
        })
    }
}

struct EntityRow {
    id: String,
    tenant_id: String,
    project_id: String,
    kind: String,
    name: String,
    created_at: i64,
    updated_at: i64,
}

impl EntityRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            project_id: row.get(2)?,
            kind: row.get(3)?,
            name: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}
