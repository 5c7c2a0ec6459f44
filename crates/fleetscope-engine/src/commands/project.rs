//! Project commands
//!
//! A project update is the one write that fans out eagerly: every
//! data-driver configuration and stream binding of the project is read,
//! cleaned up against the new scope and written back in the same
//! transaction. Applications and data
//! streams are left alone and pick up the change on their next read.

#![allow(clippy::result_large_err)]

use std::collections::BTreeSet;

use fleetscope_core::core_types::TenantScope;
use fleetscope_core::rules::normalize_project;
use fleetscope_core::{
    authorized_project, resolve_project_scope, ChangeKind, ChangeSink, DataDriverConfig,
    DataDriverStream, EntityEvent, ExError, ExErrorKind, Project, ScopeError,
};
use fleetscope_store::errors::{from_rusqlite, Result};
use fleetscope_store::{
    ConfigRepo, LabelRepo, ProjectRepo, ServiceDomainBindingService, SqliteBindingStore,
    SqliteProjectLookup, StreamRepo,
};
use rusqlite::Connection;

use super::data_driver::rebind;
use super::{require_infra_admin, run_op};

/// Create a project
///
/// The field the selection mode does not use is cleared before the project
/// is stored.
///
/// # Errors
/// * `PermissionDenied` - caller is not an infra admin
/// * `ConstraintViolation` - the ID is taken, in this or any other tenant
/// * `EdgeNotFound` - an explicit edge ID is not an edge of the tenant
/// * `NotFound` - a selector term names an unknown category value
pub fn project_create(
    scope: &TenantScope,
    conn: &mut Connection,
    project: Project,
    sink: &dyn ChangeSink,
) -> Result<Project> {
    let project = run_op("project_create", scope, || {
        require_infra_admin(scope)?;

        let mut project = project;
        project.tenant_id = scope.tenant_id().to_string();
        if ProjectRepo::id_exists(conn, &project.id)? {
            return Err(ExError::new(ExErrorKind::ConstraintViolation)
                .with_entity_id(project.id.clone())
                .with_message("project already exists"));
        }

        let known_edges = LabelRepo::edge_ids(conn, scope.tenant_id())?;
        normalize_project(&mut project, &known_edges)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        ProjectRepo::persist_project(&tx, &project)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(project)
    })?;

    sink.publish(EntityEvent::Project {
        change: ChangeKind::Created,
        project: project.clone(),
    });
    Ok(project)
}

/// Outcome of a project update
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub project: Project,
    /// Data-driver configurations whose binding was rewritten
    pub configs: Vec<DataDriverConfig>,
    /// Data-driver streams whose binding was rewritten
    pub streams: Vec<DataDriverStream>,
}

/// Update a project and bring its materialized bindings in line
///
/// Runs in one transaction: the project row is written, then each
/// data-driver configuration and stream of the project has its binding
/// read, cleaned up against the new scope and set again. A failure anywhere
/// rolls everything back.
///
/// # Errors
/// * `PermissionDenied` - caller is not an infra admin
/// * `ProjectNotFound` - no such project in the tenant
/// * `EdgeNotFound` - an explicit edge ID is not an edge of the tenant
pub fn project_update(
    scope: &TenantScope,
    conn: &mut Connection,
    project: Project,
    sink: &dyn ChangeSink,
) -> Result<ProjectUpdate> {
    let update = run_op("project_update", scope, || {
        require_infra_admin(scope)?;

        let existing = ProjectRepo::find_project(conn, scope.tenant_id(), &project.id)?
            .ok_or_else(|| ScopeError::ProjectNotFound {
                project_id: project.id.clone(),
            })?;

        let mut project = project;
        project.tenant_id = existing.tenant_id;
        project.created_at = existing.created_at;
        project.updated_at = chrono::Utc::now();

        let known_edges = LabelRepo::edge_ids(conn, scope.tenant_id())?;
        normalize_project(&mut project, &known_edges)?;

        let bindings = SqliteBindingStore::new(scope.tenant_id());
        let tx = conn.transaction().map_err(from_rusqlite)?;
        ProjectRepo::persist_project(&tx, &project)?;

        let edges = LabelRepo::label_snapshot(&tx, scope.tenant_id())?;
        let mut configs = Vec::new();
        for config_id in ConfigRepo::config_ids_for_project(&tx, &project.id)? {
            let mut binding = bindings.get(&tx, &config_id)?;
            rebind(&bindings, &tx, &config_id, &project, &mut binding, &edges)?;

            if let Some(mut config) = ConfigRepo::find_config(&tx, scope.tenant_id(), &config_id)? {
                config.binding = binding;
                configs.push(config);
            }
        }

        let mut streams = Vec::new();
        for stream_id in StreamRepo::stream_ids_for_project(&tx, &project.id)? {
            let mut binding = bindings.get(&tx, &stream_id)?;
            rebind(&bindings, &tx, &stream_id, &project, &mut binding, &edges)?;

            if let Some(mut stream) = StreamRepo::find_stream(&tx, scope.tenant_id(), &stream_id)? {
                stream.binding = binding;
                streams.push(stream);
            }
        }

        tx.commit().map_err(from_rusqlite)?;
        tracing::debug!(
            project_id = %project.id,
            binding_count = configs.len() + streams.len(),
            "project bindings cleaned up"
        );
        Ok(ProjectUpdate {
            project,
            configs,
            streams,
        })
    })?;

    sink.publish(EntityEvent::Project {
        change: ChangeKind::Updated,
        project: update.project.clone(),
    });
    for config in &update.configs {
        sink.publish(EntityEvent::binding(ChangeKind::Updated, config));
    }
    for stream in &update.streams {
        sink.publish(EntityEvent::stream_binding(ChangeKind::Updated, stream));
    }
    Ok(update)
}

/// Load a project the caller is a member of
pub fn project_get(scope: &TenantScope, conn: &Connection, project_id: &str) -> Result<Project> {
    run_op("project_get", scope, || {
        authorized_project(&SqliteProjectLookup::new(conn), scope, project_id)
    })
}

/// Projects of the tenant visible to the caller
pub fn project_list(scope: &TenantScope, conn: &Connection) -> Result<Vec<Project>> {
    run_op("project_list", scope, || {
        let mut projects = ProjectRepo::list_projects(conn, scope.tenant_id())?;
        projects.retain(|p| scope.is_member(&p.id));
        Ok(projects)
    })
}

/// Resolve a project's current edge set from live labels
///
/// # Errors
/// * `ProjectNotFound` - no such project in the tenant
/// * `PermissionDenied` - caller is not a member of the project
pub fn project_scope(
    scope: &TenantScope,
    conn: &Connection,
    project_id: &str,
) -> Result<BTreeSet<String>> {
    run_op("project_scope", scope, || {
        let project = authorized_project(&SqliteProjectLookup::new(conn), scope, project_id)?;
        let edges = LabelRepo::label_snapshot(conn, scope.tenant_id())?;
        Ok(resolve_project_scope(&project, &edges))
    })
}
