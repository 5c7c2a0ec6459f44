//! Binding store for materialized service-domain bindings
//!
//! A binding is persisted as rows keyed by the owning configuration's or
//! stream's ID: per-edge rows tagged DEPLOY/UNDEPLOY, selector rows
//! referencing category values, and one row recording the mode it was
//! written in.

#![allow(clippy::result_large_err)]

use std::collections::{BTreeMap, BTreeSet};

use fleetscope_core::{BindingMode, EntityState, ServiceDomainBinding};
use rusqlite::{Connection, OptionalExtension, Transaction};

use crate::errors::{corrupt_row, from_rusqlite, Result};
use crate::repo::{load_selector_for_binding, LabelRepo};

/// Persistence of [`ServiceDomainBinding`] values
///
/// `set` replaces everything stored for an ID, writing only the fields
/// `binding.mode` persists. It runs inside the caller's transaction so a
/// failure leaves the previous rows in place once the transaction is
/// dropped. `set_all` offers no atomicity across IDs beyond
/// that same transaction.
pub trait ServiceDomainBindingService {
    fn set(&self, tx: &Transaction<'_>, id: &str, binding: &ServiceDomainBinding) -> Result<()>;

    fn set_all(
        &self,
        tx: &Transaction<'_>,
        bindings: &BTreeMap<String, ServiceDomainBinding>,
    ) -> Result<()> {
        for (id, binding) in bindings {
            self.set(tx, id, binding)?;
        }
        Ok(())
    }

    fn get(&self, conn: &Connection, id: &str) -> Result<ServiceDomainBinding>;

    fn get_all(
        &self,
        conn: &Connection,
        ids: &[String],
    ) -> Result<BTreeMap<String, ServiceDomainBinding>> {
        ids.iter()
            .map(|id| Ok((id.clone(), self.get(conn, id)?)))
            .collect()
    }
}

/// SQLite-backed binding store over the `data_driver_*` tables
///
/// Scoped to one tenant: selector terms resolve against that tenant's
/// categories only.
#[derive(Debug, Clone)]
pub struct SqliteBindingStore {
    tenant_id: String,
}

impl SqliteBindingStore {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
        }
    }

    pub(crate) fn delete_rows(conn: &Connection, id: &str) -> Result<()> {
        for table in [
            "data_driver_edges",
            "data_driver_edge_selectors",
            "data_driver_binding_modes",
        ] {
            conn.execute(&format!("DELETE FROM {table} WHERE params_id = ?1"), [id])
                .map_err(from_rusqlite)?;
        }
        Ok(())
    }

    fn insert_edge(conn: &Connection, id: &str, edge_id: &str, state: EntityState) -> Result<()> {
        conn.execute(
            "INSERT INTO data_driver_edges (params_id, edge_id, state) VALUES (?1, ?2, ?3)",
            [id, edge_id, state.as_str()],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    fn stored_mode(conn: &Connection, id: &str) -> Result<Option<BindingMode>> {
        let mode: Option<String> = conn
            .query_row(
                "SELECT mode FROM data_driver_binding_modes WHERE params_id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        mode.map(|m| m.parse::<BindingMode>())
            .transpose()
            .map_err(|e| corrupt_row("data_driver_binding_modes", e))
    }
}

impl ServiceDomainBindingService for SqliteBindingStore {
    fn set(&self, tx: &Transaction<'_>, id: &str, binding: &ServiceDomainBinding) -> Result<()> {
        Self::delete_rows(tx, id)?;

        let mode = binding.mode;
        match mode {
            BindingMode::Explicit => {
                for edge_id in &binding.service_domain_ids {
                    Self::insert_edge(tx, id, edge_id, EntityState::Deploy)?;
                }
            }
            BindingMode::Selector => {
                for (category_id, value) in binding.service_domain_selectors.iter() {
                    let value_id =
                        LabelRepo::resolve_category_value(tx, &self.tenant_id, category_id, value)?;
                    tx.execute(
                        "INSERT INTO data_driver_edge_selectors (params_id, category_value_id)
                         VALUES (?1, ?2)",
                        rusqlite::params![id, value_id],
                    )
                    .map_err(from_rusqlite)?;
                }
                for edge_id in &binding.exclude_service_domain_ids {
                    Self::insert_edge(tx, id, edge_id, EntityState::Undeploy)?;
                }
            }
        }

        tx.execute(
            "INSERT INTO data_driver_binding_modes (params_id, mode) VALUES (?1, ?2)",
            [id, mode.as_str()],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(
            binding_id = id,
            mode = mode.as_str(),
            edge_count = binding.service_domain_ids.len(),
            selector_count = binding.service_domain_selectors.len(),
            "binding rows replaced"
        );
        Ok(())
    }

    fn get(&self, conn: &Connection, id: &str) -> Result<ServiceDomainBinding> {
        let mut stmt = conn
            .prepare("SELECT edge_id, state FROM data_driver_edges WHERE params_id = ?1")
            .map_err(from_rusqlite)?;
        let edge_rows = stmt
            .query_map([id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let mut deploy = BTreeSet::new();
        let mut undeploy = BTreeSet::new();
        for (edge_id, state) in edge_rows {
            match state
                .parse::<EntityState>()
                .map_err(|e| corrupt_row("data_driver_edges", e))?
            {
                EntityState::Deploy => deploy.insert(edge_id),
                EntityState::Undeploy => undeploy.insert(edge_id),
            };
        }

        let selectors = load_selector_for_binding(conn, id)?;

        // Rows written before modes were stored fall back to row presence
        let mode = match Self::stored_mode(conn, id)? {
            Some(mode) => mode,
            None if !selectors.is_empty() => BindingMode::Selector,
            None => BindingMode::Explicit,
        };

        Ok(match mode {
            BindingMode::Selector => ServiceDomainBinding {
                mode,
                service_domain_ids: BTreeSet::new(),
                exclude_service_domain_ids: undeploy,
                service_domain_selectors: selectors,
            },
            BindingMode::Explicit => ServiceDomainBinding {
                mode,
                service_domain_ids: deploy,
                exclude_service_domain_ids: undeploy,
                service_domain_selectors: Default::default(),
            },
        })
    }
}
