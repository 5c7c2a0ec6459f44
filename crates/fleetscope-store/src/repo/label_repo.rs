//! Label store: categories, category values, edges and edge labels

#![allow(clippy::result_large_err)]

use std::collections::{BTreeMap, BTreeSet};

use fleetscope_core::{
    Category, CategoryValue, Edge, EdgeLabelSnapshot, ExError, Labels, ScopeError,
};
use rusqlite::{Connection, OptionalExtension};

use super::ensure_owned;
use crate::errors::{from_rusqlite, Result};

pub struct LabelRepo;

impl LabelRepo {
    /// Insert or update a category and reconcile its values
    ///
    /// Values that survive keep their storage key, so selectors and labels
    /// referencing them stay intact. Removed values cascade out of every
    /// label and selector that used them.
    ///
    /// # Errors
    /// * `ConstraintViolation` - the ID belongs to another tenant's category
    pub fn upsert_category(conn: &Connection, category: &Category) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let changed = conn
            .execute(
                "INSERT INTO categories (id, tenant_id, name, purpose, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    purpose = excluded.purpose,
                    updated_at = excluded.updated_at
                 WHERE categories.tenant_id = excluded.tenant_id",
                rusqlite::params![category.id, category.tenant_id, category.name, category.purpose, now],
            )
            .map_err(from_rusqlite)?;
        ensure_owned(changed, "categories", &category.id)?;

        let existing = Self::category_values(conn, &category.id)?;
        for stale in existing.iter().filter(|v| !category.values.contains(v)) {
            conn.execute(
                "DELETE FROM category_values WHERE category_id = ?1 AND value = ?2",
                rusqlite::params![category.id, stale],
            )
            .map_err(from_rusqlite)?;
        }
        for value in &category.values {
            conn.execute(
                "INSERT OR IGNORE INTO category_values (category_id, value) VALUES (?1, ?2)",
                rusqlite::params![category.id, value],
            )
            .map_err(from_rusqlite)?;
        }

        Ok(())
    }

    pub fn get_category(conn: &Connection, category_id: &str) -> Result<Option<Category>> {
        let row = conn
            .query_row(
                "SELECT id, tenant_id, name, purpose FROM categories WHERE id = ?1",
                [category_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(from_rusqlite)?;

        match row {
            Some((id, tenant_id, name, purpose)) => {
                let values = Self::category_values(conn, &id)?;
                let mut category = Category::new(id, tenant_id, name, values);
                category.purpose = purpose;
                Ok(Some(category))
            }
            None => Ok(None),
        }
    }

    /// All categories of a tenant, sorted by ID
    pub fn list_categories(conn: &Connection, tenant_id: &str) -> Result<Vec<Category>> {
        let mut stmt = conn
            .prepare("SELECT id FROM categories WHERE tenant_id = ?1 ORDER BY id")
            .map_err(from_rusqlite)?;
        let ids = stmt
            .query_map([tenant_id], |row| row.get::<_, String>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let mut categories = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(category) = Self::get_category(conn, &id)? {
                categories.push(category);
            }
        }
        Ok(categories)
    }

    fn category_values(conn: &Connection, category_id: &str) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT value FROM category_values WHERE category_id = ?1 ORDER BY id")
            .map_err(from_rusqlite)?;
        let values = stmt
            .query_map([category_id], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(values)
    }

    /// Storage key of a category value owned by `tenant_id`
    ///
    /// # Errors
    /// * `CategoryNotFound` - no such category in the tenant
    /// * `CategoryValueNotFound` - category exists without this value
    pub fn resolve_category_value(
        conn: &Connection,
        tenant_id: &str,
        category_id: &str,
        value: &str,
    ) -> Result<i64> {
        let id = conn
            .query_row(
                "SELECT cv.id FROM category_values cv JOIN categories c ON c.id = cv.category_id
                 WHERE c.tenant_id = ?1 AND cv.category_id = ?2 AND cv.value = ?3",
                [tenant_id, category_id, value],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        if let Some(id) = id {
            return Ok(id);
        }

        let category_exists = conn
            .query_row(
                "SELECT 1 FROM categories WHERE tenant_id = ?1 AND id = ?2",
                [tenant_id, category_id],
                |_| Ok(()),
            )
            .optional()
            .map_err(from_rusqlite)?
            .is_some();

        let err = if category_exists {
            ScopeError::CategoryValueNotFound {
                category_id: category_id.to_string(),
                value: value.to_string(),
            }
        } else {
            ScopeError::CategoryNotFound {
                category_id: category_id.to_string(),
            }
        };
        Err(ExError::from(err).with_op("resolve_category_value"))
    }

    /// Insert or update an edge together with its labels
    ///
    /// # Errors
    /// * `ConstraintViolation` - the ID belongs to another tenant's edge
    pub fn upsert_edge(conn: &Connection, edge: &Edge) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let changed = conn
            .execute(
                "INSERT INTO edges (id, tenant_id, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    updated_at = excluded.updated_at
                 WHERE edges.tenant_id = excluded.tenant_id",
                rusqlite::params![edge.id, edge.tenant_id, edge.name, now],
            )
            .map_err(from_rusqlite)?;
        ensure_owned(changed, "edges", &edge.id)?;

        Self::set_edge_labels(conn, &edge.id, &edge.labels)
    }

    /// Replace an edge's labels wholesale
    ///
    /// Labels resolve against the edge's own tenant.
    ///
    /// # Errors
    /// * `EdgeNotFound` - no such edge
    /// * `CategoryNotFound` / `CategoryValueNotFound` - unknown label
    pub fn set_edge_labels(conn: &Connection, edge_id: &str, labels: &Labels) -> Result<()> {
        let tenant_id: Option<String> = conn
            .query_row("SELECT tenant_id FROM edges WHERE id = ?1", [edge_id], |row| row.get(0))
            .optional()
            .map_err(from_rusqlite)?;
        let Some(tenant_id) = tenant_id else {
            return Err(ExError::from(ScopeError::EdgeNotFound {
                edge_id: edge_id.to_string(),
            })
            .with_op("set_edge_labels"));
        };

        conn.execute("DELETE FROM edge_labels WHERE edge_id = ?1", [edge_id])
            .map_err(from_rusqlite)?;
        for (category_id, value) in labels.iter() {
            let value_id = Self::resolve_category_value(conn, &tenant_id, category_id, value)?;
            conn.execute(
                "INSERT INTO edge_labels (edge_id, category_value_id) VALUES (?1, ?2)",
                rusqlite::params![edge_id, value_id],
            )
            .map_err(from_rusqlite)?;
        }

        tracing::trace!(edge_id, label_count = labels.iter().count(), "edge labels replaced");
        Ok(())
    }

    pub fn get_edge(conn: &Connection, edge_id: &str) -> Result<Option<Edge>> {
        let row = conn
            .query_row(
                "SELECT id, tenant_id, name FROM edges WHERE id = ?1",
                [edge_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
            )
            .optional()
            .map_err(from_rusqlite)?;

        let Some((id, tenant_id, name)) = row else {
            return Ok(None);
        };
        let labels = Self::load_labels(conn, "WHERE el.edge_id = ?1", edge_id)?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(Edge::new(id, tenant_id, name).with_labels(labels)))
    }

    /// IDs of every edge of a tenant
    pub fn edge_ids(conn: &Connection, tenant_id: &str) -> Result<BTreeSet<String>> {
        let mut stmt = conn
            .prepare("SELECT id FROM edges WHERE tenant_id = ?1")
            .map_err(from_rusqlite)?;
        let ids = stmt
            .query_map([tenant_id], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<BTreeSet<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(ids)
    }

    /// Current labels of every edge of a tenant
    ///
    /// Unlabelled edges are included with empty labels.
    pub fn label_snapshot(conn: &Connection, tenant_id: &str) -> Result<EdgeLabelSnapshot> {
        let mut labels = Self::load_labels(
            conn,
            "JOIN edges e ON e.id = el.edge_id WHERE e.tenant_id = ?1",
            tenant_id,
        )?;

        let snapshot = Self::edge_ids(conn, tenant_id)?
            .into_iter()
            .map(|id| {
                let edge_labels = labels.remove(&id).unwrap_or_default();
                (id, edge_labels)
            })
            .collect();
        Ok(snapshot)
    }

    fn load_labels(conn: &Connection, filter: &str, param: &str) -> Result<BTreeMap<String, Labels>> {
        let sql = format!(
            "SELECT el.edge_id, cv.category_id, cv.value
             FROM edge_labels el JOIN category_values cv ON cv.id = el.category_value_id
             {filter}"
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([param], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    CategoryValue::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let mut grouped: BTreeMap<String, Vec<CategoryValue>> = BTreeMap::new();
        for (edge_id, value) in rows {
            grouped.entry(edge_id).or_default().push(value);
        }
        Ok(grouped
            .into_iter()
            .map(|(edge_id, values)| (edge_id, values.into_iter().collect()))
            .collect())
    }
}
