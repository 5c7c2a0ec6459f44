#![allow(clippy::result_large_err)]

use std::collections::BTreeSet;

use fleetscope_core::{EdgeSelectorType, Project};
use rusqlite::{Connection, OptionalExtension, Row};

use super::{ensure_owned, id_taken, load_selector, replace_selector, timestamp};
use crate::errors::{corrupt_row, from_rusqlite, Result};

const SELECT_PROJECT: &str =
    "SELECT id, tenant_id, name, edge_selector_type, created_at, updated_at FROM projects";

pub struct ProjectRepo;

impl ProjectRepo {
    /// Persist a project and replace its scope rows
    ///
    /// Both scope fields are written as given; callers normalize first.
    ///
    /// # Errors
    /// * `ConstraintViolation` - the ID belongs to another tenant's project;
    ///   nothing is written
    pub fn persist_project(conn: &Connection, project: &Project) -> Result<()> {
        let changed = conn
            .execute(
                "INSERT INTO projects (id, tenant_id, name, edge_selector_type, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    edge_selector_type = excluded.edge_selector_type,
                    updated_at = excluded.updated_at
                 WHERE projects.tenant_id = excluded.tenant_id",
                rusqlite::params![
                    project.id,
                    project.tenant_id,
                    project.name,
                    project.edge_selector_type.as_str(),
                    project.created_at.timestamp(),
                    project.updated_at.timestamp(),
                ],
            )
            .map_err(from_rusqlite)?;
        ensure_owned(changed, "projects", &project.id)?;

        conn.execute("DELETE FROM project_edges WHERE project_id = ?1", [&project.id])
            .map_err(from_rusqlite)?;
        for edge_id in &project.edge_ids {
            conn.execute(
                "INSERT INTO project_edges (project_id, edge_id) VALUES (?1, ?2)",
                [&project.id, edge_id],
            )
            .map_err(from_rusqlite)?;
        }

        replace_selector(
            conn,
            &project.tenant_id,
            "project_edge_selectors",
            "project_id",
            &project.id,
            &project.edge_selectors,
        )
    }

    /// Whether any tenant already has a project with this ID
    pub fn id_exists(conn: &Connection, project_id: &str) -> Result<bool> {
        id_taken(conn, &["projects"], project_id)
    }

    /// Load a project of a tenant
    pub fn find_project(conn: &Connection, tenant_id: &str, project_id: &str) -> Result<Option<Project>> {
        let sql = format!("{SELECT_PROJECT} WHERE tenant_id = ?1 AND id = ?2");
        let row = conn
            .query_row(&sql, [tenant_id, project_id], ProjectRow::from_row)
            .optional()
            .map_err(from_rusqlite)?;

        match row {
            Some(row) => Ok(Some(Self::hydrate(conn, row)?)),
            None => Ok(None),
        }
    }

    /// All projects of a tenant, sorted by ID
    pub fn list_projects(conn: &Connection, tenant_id: &str) -> Result<Vec<Project>> {
        let sql = format!("{SELECT_PROJECT} WHERE tenant_id = ?1 ORDER BY id");
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([tenant_id], ProjectRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter().map(|row| Self::hydrate(conn, row)).collect()
    }

    fn hydrate(conn: &Connection, row: ProjectRow) -> Result<Project> {
        let edge_selector_type: EdgeSelectorType = row
            .edge_selector_type
            .parse()
            .map_err(|e| corrupt_row("projects", e))?;

        let mut stmt = conn
            .prepare("SELECT edge_id FROM project_edges WHERE project_id = ?1")
            .map_err(from_rusqlite)?;
        let edge_ids = stmt
            .query_map([&row.id], |r| r.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<BTreeSet<String>, _>>()
            .map_err(from_rusqlite)?;

        let edge_selectors = load_selector(conn, "project_edge_selectors", "project_id", &row.id)?;

        Ok(Project {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            edge_selector_type,
            edge_ids,
            edge_selectors,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
        })
    }
}

struct ProjectRow {
    id: String,
    tenant_id: String,
    name: String,
    edge_selector_type: String,
    created_at: i64,
    updated_at: i64,
}

impl ProjectRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            name: row.get(2)?,
            edge_selector_type: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
