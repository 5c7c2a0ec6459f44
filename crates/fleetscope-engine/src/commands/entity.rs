//! Application and DataStream commands
//!
//! Writes store the caller's scope fields after narrowing them against the
//! project. Reads never return stored scope: they resolve the effective
//! edge set from the current project and a fresh label snapshot.

#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;

use fleetscope_core::core_types::TenantScope;
use fleetscope_core::rules::{check_project_unchanged, validate_entity_against_project};
use fleetscope_core::{
    authorized_project, resolve_entity_scope, resolve_entity_scope_checked, ChangeKind,
    ChangeSink, EntityEvent, EntityKind, EntityScope, ExError, ExErrorKind, Project, ScopeError,
    ScopedEntity,
};
use fleetscope_store::errors::{from_rusqlite, Result};
use fleetscope_store::{EntityRepo, LabelRepo, ProjectRepo, SqliteProjectLookup};
use rusqlite::Connection;

use super::run_op;

/// Create an application or data stream
///
/// # Errors
/// * `ConstraintViolation` - the ID is taken, in this or any other tenant
/// * `ProjectNotFound` / `PermissionDenied` - project missing or not visible
/// * `EdgesOutsideProject` - explicit IDs the project does not hold
/// * `NotFound` - selector term names an unknown category value
pub fn entity_create(
    scope: &TenantScope,
    conn: &mut Connection,
    entity: ScopedEntity,
    sink: &dyn ChangeSink,
) -> Result<ScopedEntity> {
    let op = match entity.kind {
        EntityKind::Application => "application_create",
        EntityKind::DataStream => "data_stream_create",
    };

    let stored = run_op(op, scope, || {
        let mut entity = entity;
        entity.tenant_id = scope.tenant_id().to_string();

        // Applications and data streams of every tenant share one ID space
        if EntityRepo::id_exists(conn, &entity.id)? {
            return Err(ExError::new(ExErrorKind::ConstraintViolation)
                .with_entity_id(entity.id.clone())
                .with_message(format!("{} already exists", entity.kind)));
        }

        let project = authorized_project(&SqliteProjectLookup::new(conn), scope, &entity.project_id)?;
        narrow_and_persist(scope, conn, &mut entity, &project)?;
        Ok(entity)
    })?;

    sink.publish(EntityEvent::scoped(ChangeKind::Created, stored.clone()));
    Ok(stored)
}

/// Update an application or data stream
///
/// The owning project cannot change.
///
/// # Errors
/// * `EntityNotFound` - no such entity
/// * `ProjectIdImmutable` - the update names another project
/// * see [`entity_create`]
pub fn entity_update(
    scope: &TenantScope,
    conn: &mut Connection,
    entity: ScopedEntity,
    sink: &dyn ChangeSink,
) -> Result<ScopedEntity> {
    let op = match entity.kind {
        EntityKind::Application => "application_update",
        EntityKind::DataStream => "data_stream_update",
    };

    let stored = run_op(op, scope, || {
        let existing = EntityRepo::find_entity(conn, scope.tenant_id(), entity.kind, &entity.id)?
            .ok_or_else(|| not_found(entity.kind, &entity.id))?;
        check_project_unchanged(&existing, &entity)?;

        let project = authorized_project(&SqliteProjectLookup::new(conn), scope, &existing.project_id)?;

        let mut entity = entity;
        entity.tenant_id = existing.tenant_id;
        entity.created_at = existing.created_at;
        entity.updated_at = chrono::Utc::now();
        narrow_and_persist(scope, conn, &mut entity, &project)?;
        Ok(entity)
    })?;

    sink.publish(EntityEvent::scoped(ChangeKind::Updated, stored.clone()));
    Ok(stored)
}

/// Delete an application or data stream
pub fn entity_delete(
    scope: &TenantScope,
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &str,
    sink: &dyn ChangeSink,
) -> Result<()> {
    let op = match kind {
        EntityKind::Application => "application_delete",
        EntityKind::DataStream => "data_stream_delete",
    };

    let deleted = run_op(op, scope, || {
        let existing = EntityRepo::find_entity(conn, scope.tenant_id(), kind, entity_id)?
            .ok_or_else(|| not_found(kind, entity_id))?;
        authorized_project(&SqliteProjectLookup::new(conn), scope, &existing.project_id)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        EntityRepo::delete_entity(&tx, kind, entity_id)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(existing)
    })?;

    sink.publish(EntityEvent::scoped(ChangeKind::Deleted, deleted));
    Ok(())
}

pub fn application_get(scope: &TenantScope, conn: &Connection, id: &str) -> Result<ScopedEntity> {
    run_op("application_get", scope, || {
        entity_get(scope, conn, EntityKind::Application, id)
    })
}

pub fn data_stream_get(scope: &TenantScope, conn: &Connection, id: &str) -> Result<ScopedEntity> {
    run_op("data_stream_get", scope, || {
        entity_get(scope, conn, EntityKind::DataStream, id)
    })
}

pub fn application_select_all(scope: &TenantScope, conn: &Connection) -> Result<Vec<ScopedEntity>> {
    run_op("application_select_all", scope, || {
        entity_select_all(scope, conn, EntityKind::Application)
    })
}

pub fn data_stream_select_all(scope: &TenantScope, conn: &Connection) -> Result<Vec<ScopedEntity>> {
    run_op("data_stream_select_all", scope, || {
        entity_select_all(scope, conn, EntityKind::DataStream)
    })
}

/// Load an entity and resolve its effective scope
///
/// The returned entity carries the effective edge IDs and selectors in
/// place of the stored ones; the exclude list is returned as stored.
fn entity_get(
    scope: &TenantScope,
    conn: &Connection,
    kind: EntityKind,
    entity_id: &str,
) -> Result<ScopedEntity> {
    let entity = EntityRepo::find_entity(conn, scope.tenant_id(), kind, entity_id)?
        .ok_or_else(|| not_found(kind, entity_id))?;
    let edges = LabelRepo::label_snapshot(conn, scope.tenant_id())?;
    let resolved = resolve_entity_scope_checked(&SqliteProjectLookup::new(conn), scope, &entity, &edges)?;
    Ok(effective_view(entity, resolved))
}

/// Every entity of a kind in projects the caller can see
///
/// One snapshot serves the whole listing. Entities resolving to no edges
/// are returned like any other.
fn entity_select_all(
    scope: &TenantScope,
    conn: &Connection,
    kind: EntityKind,
) -> Result<Vec<ScopedEntity>> {
    let edges = LabelRepo::label_snapshot(conn, scope.tenant_id())?;
    let mut projects: BTreeMap<String, Option<Project>> = BTreeMap::new();
    let mut out = Vec::new();

    for entity in EntityRepo::list_entities(conn, scope.tenant_id(), kind)? {
        if !scope.is_member(&entity.project_id) {
            continue;
        }
        if !projects.contains_key(&entity.project_id) {
            let project = ProjectRepo::find_project(conn, scope.tenant_id(), &entity.project_id)?;
            projects.insert(entity.project_id.clone(), project);
        }
        let Some(Some(project)) = projects.get(&entity.project_id) else {
            tracing::debug!(entity_id = %entity.id, project_id = %entity.project_id, "skipping entity of missing project");
            continue;
        };

        let resolved = resolve_entity_scope(&entity, project, &edges);
        out.push(effective_view(entity, resolved));
    }

    Ok(out)
}

fn narrow_and_persist(
    scope: &TenantScope,
    conn: &mut Connection,
    entity: &mut ScopedEntity,
    project: &Project,
) -> Result<()> {
    let categories = LabelRepo::list_categories(conn, scope.tenant_id())?;
    validate_entity_against_project(entity, project, &categories)?;

    let tx = conn.transaction().map_err(from_rusqlite)?;
    EntityRepo::persist_entity(&tx, entity)?;
    tx.commit().map_err(from_rusqlite)?;
    Ok(())
}

fn effective_view(mut entity: ScopedEntity, resolved: EntityScope) -> ScopedEntity {
    entity.edge_ids = resolved.edge_ids;
    entity.edge_selectors = resolved.edge_selectors;
    entity.exclude_edge_ids = resolved.exclude_edge_ids;
    entity
}

fn not_found(kind: EntityKind, entity_id: &str) -> ExError {
    ScopeError::EntityNotFound {
        kind: kind.to_string(),
        entity_id: entity_id.to_string(),
    }
    .into()
}
