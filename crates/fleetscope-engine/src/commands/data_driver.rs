//! Data-driver configuration and stream commands
//!
//! Unlike applications and data streams, a configuration's or data-driver
//! stream's scope is materialized: its binding is cleaned up against the
//! project and stored as rows in the same transaction as the owner itself.

#![allow(clippy::result_large_err)]

use fleetscope_core::core_types::TenantScope;
use fleetscope_core::{
    authorized_project, cleanup_binding, ChangeKind, ChangeSink, DataDriverConfig,
    DataDriverStream, EdgeLabelSnapshot, EntityEvent, ExError, ExErrorKind, Project, ScopeError,
    ServiceDomainBinding,
};
use fleetscope_store::errors::{from_rusqlite, Result};
use fleetscope_store::{
    ConfigRepo, LabelRepo, ServiceDomainBindingService, SqliteBindingStore, SqliteProjectLookup,
    StreamRepo,
};
use rusqlite::{Connection, Transaction};

use super::run_op;

/// Create a configuration and materialize its binding
///
/// # Errors
/// * `ConstraintViolation` - a configuration or stream already uses the ID,
///   in any tenant
/// * `ProjectNotFound` / `PermissionDenied` - project missing or not visible
/// * `NotFound` - a selector term names an unknown category value; nothing
///   is written
pub fn data_driver_config_create(
    scope: &TenantScope,
    conn: &mut Connection,
    config: DataDriverConfig,
    sink: &dyn ChangeSink,
) -> Result<DataDriverConfig> {
    let stored = run_op("data_driver_config_create", scope, || {
        let mut config = config;
        config.tenant_id = scope.tenant_id().to_string();
        ensure_id_free(conn, &config.id, "data driver config already exists")?;

        let project = authorized_project(&SqliteProjectLookup::new(conn), scope, &config.project_id)?;
        let tx = conn.transaction().map_err(from_rusqlite)?;
        ConfigRepo::persist_config(&tx, &config)?;
        materialize(&tx, scope, &config.id, &project, &mut config.binding)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(config)
    })?;

    sink.publish(EntityEvent::binding(ChangeKind::Created, &stored));
    Ok(stored)
}

/// Replace a configuration's name and binding
///
/// # Errors
/// * `ConfigNotFound` - no such configuration in the tenant
/// * `ProjectIdImmutable` - the update names another project
pub fn data_driver_config_update(
    scope: &TenantScope,
    conn: &mut Connection,
    config: DataDriverConfig,
    sink: &dyn ChangeSink,
) -> Result<DataDriverConfig> {
    let stored = run_op("data_driver_config_update", scope, || {
        let existing = ConfigRepo::find_config(conn, scope.tenant_id(), &config.id)?
            .ok_or_else(|| config_not_found(&config.id))?;
        ensure_same_project(&existing.id, &existing.project_id, &config.project_id)?;

        let project = authorized_project(&SqliteProjectLookup::new(conn), scope, &existing.project_id)?;

        let mut config = config;
        config.tenant_id = existing.tenant_id;
        let tx = conn.transaction().map_err(from_rusqlite)?;
        ConfigRepo::persist_config(&tx, &config)?;
        materialize(&tx, scope, &config.id, &project, &mut config.binding)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(config)
    })?;

    sink.publish(EntityEvent::binding(ChangeKind::Updated, &stored));
    Ok(stored)
}

/// Load a configuration with its persisted binding
pub fn data_driver_config_get(
    scope: &TenantScope,
    conn: &Connection,
    config_id: &str,
) -> Result<DataDriverConfig> {
    run_op("data_driver_config_get", scope, || {
        let mut config = ConfigRepo::find_config(conn, scope.tenant_id(), config_id)?
            .ok_or_else(|| config_not_found(config_id))?;
        authorized_project(&SqliteProjectLookup::new(conn), scope, &config.project_id)?;

        config.binding = SqliteBindingStore::new(scope.tenant_id()).get(conn, &config.id)?;
        Ok(config)
    })
}

/// Delete a configuration and its binding rows
pub fn data_driver_config_delete(
    scope: &TenantScope,
    conn: &mut Connection,
    config_id: &str,
    sink: &dyn ChangeSink,
) -> Result<()> {
    let deleted = run_op("data_driver_config_delete", scope, || {
        let mut config = ConfigRepo::find_config(conn, scope.tenant_id(), config_id)?
            .ok_or_else(|| config_not_found(config_id))?;
        authorized_project(&SqliteProjectLookup::new(conn), scope, &config.project_id)?;
        config.binding = SqliteBindingStore::new(scope.tenant_id()).get(conn, &config.id)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        ConfigRepo::delete_config(&tx, config_id)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(config)
    })?;

    sink.publish(EntityEvent::binding(ChangeKind::Deleted, &deleted));
    Ok(())
}

/// Create a data-driver stream and materialize its binding
///
/// # Errors
/// * `ConstraintViolation` - a configuration or stream already uses the ID,
///   in any tenant
/// * `ProjectNotFound` / `PermissionDenied` - project missing or not visible
/// * `NotFound` - a selector term names an unknown category value
pub fn data_driver_stream_create(
    scope: &TenantScope,
    conn: &mut Connection,
    stream: DataDriverStream,
    sink: &dyn ChangeSink,
) -> Result<DataDriverStream> {
    let stored = run_op("data_driver_stream_create", scope, || {
        let mut stream = stream;
        stream.tenant_id = scope.tenant_id().to_string();
        ensure_id_free(conn, &stream.id, "data driver stream already exists")?;

        let project = authorized_project(&SqliteProjectLookup::new(conn), scope, &stream.project_id)?;
        let tx = conn.transaction().map_err(from_rusqlite)?;
        StreamRepo::persist_stream(&tx, &stream)?;
        materialize(&tx, scope, &stream.id, &project, &mut stream.binding)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(stream)
    })?;

    sink.publish(EntityEvent::stream_binding(ChangeKind::Created, &stored));
    Ok(stored)
}

/// Replace a stream's name and binding
///
/// The direction is fixed at creation; a different requested direction is
/// ignored and the stored one is returned.
///
/// # Errors
/// * `StreamNotFound` - no such stream in the tenant
/// * `ProjectIdImmutable` - the update names another project
pub fn data_driver_stream_update(
    scope: &TenantScope,
    conn: &mut Connection,
    stream: DataDriverStream,
    sink: &dyn ChangeSink,
) -> Result<DataDriverStream> {
    let stored = run_op("data_driver_stream_update", scope, || {
        let existing = StreamRepo::find_stream(conn, scope.tenant_id(), &stream.id)?
            .ok_or_else(|| stream_not_found(&stream.id))?;
        ensure_same_project(&existing.id, &existing.project_id, &stream.project_id)?;

        let project = authorized_project(&SqliteProjectLookup::new(conn), scope, &existing.project_id)?;

        let mut stream = stream;
        stream.tenant_id = existing.tenant_id;
        if stream.direction != existing.direction {
            tracing::debug!(
                stream_id = %stream.id,
                requested = stream.direction.as_str(),
                kept = existing.direction.as_str(),
                "stream direction is immutable"
            );
            stream.direction = existing.direction;
        }

        let tx = conn.transaction().map_err(from_rusqlite)?;
        StreamRepo::persist_stream(&tx, &stream)?;
        materialize(&tx, scope, &stream.id, &project, &mut stream.binding)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(stream)
    })?;

    sink.publish(EntityEvent::stream_binding(ChangeKind::Updated, &stored));
    Ok(stored)
}

/// Load a stream with its persisted binding
pub fn data_driver_stream_get(
    scope: &TenantScope,
    conn: &Connection,
    stream_id: &str,
) -> Result<DataDriverStream> {
    run_op("data_driver_stream_get", scope, || {
        let mut stream = StreamRepo::find_stream(conn, scope.tenant_id(), stream_id)?
            .ok_or_else(|| stream_not_found(stream_id))?;
        authorized_project(&SqliteProjectLookup::new(conn), scope, &stream.project_id)?;

        stream.binding = SqliteBindingStore::new(scope.tenant_id()).get(conn, &stream.id)?;
        Ok(stream)
    })
}

/// Delete a stream and clear its binding rows
pub fn data_driver_stream_delete(
    scope: &TenantScope,
    conn: &mut Connection,
    stream_id: &str,
    sink: &dyn ChangeSink,
) -> Result<()> {
    let deleted = run_op("data_driver_stream_delete", scope, || {
        let mut stream = StreamRepo::find_stream(conn, scope.tenant_id(), stream_id)?
            .ok_or_else(|| stream_not_found(stream_id))?;
        authorized_project(&SqliteProjectLookup::new(conn), scope, &stream.project_id)?;
        stream.binding = SqliteBindingStore::new(scope.tenant_id()).get(conn, &stream.id)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        StreamRepo::delete_stream(&tx, stream_id)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(stream)
    })?;

    sink.publish(EntityEvent::stream_binding(ChangeKind::Deleted, &deleted));
    Ok(())
}

/// Clean up `binding` against `project`, normalize it and store it
///
/// On return `binding` equals what a later read of `owner_id` yields.
pub(crate) fn rebind(
    bindings: &SqliteBindingStore,
    tx: &Transaction<'_>,
    owner_id: &str,
    project: &Project,
    binding: &mut ServiceDomainBinding,
    edges: &EdgeLabelSnapshot,
) -> Result<()> {
    cleanup_binding(project, binding, edges);
    binding.normalize();
    bindings.set(tx, owner_id, binding)
}

fn materialize(
    tx: &Transaction<'_>,
    scope: &TenantScope,
    owner_id: &str,
    project: &Project,
    binding: &mut ServiceDomainBinding,
) -> Result<()> {
    let edges = LabelRepo::label_snapshot(tx, scope.tenant_id())?;
    rebind(
        &SqliteBindingStore::new(scope.tenant_id()),
        tx,
        owner_id,
        project,
        binding,
        &edges,
    )
}

fn ensure_id_free(conn: &Connection, id: &str, message: &str) -> Result<()> {
    if ConfigRepo::binding_owner_exists(conn, id)? {
        return Err(ExError::new(ExErrorKind::ConstraintViolation)
            .with_entity_id(id.to_string())
            .with_message(message.to_string()));
    }
    Ok(())
}

fn ensure_same_project(owner_id: &str, existing: &str, requested: &str) -> Result<()> {
    if existing != requested {
        return Err(ScopeError::ProjectIdImmutable {
            entity_id: owner_id.to_string(),
            existing: existing.to_string(),
            requested: requested.to_string(),
        }
        .into());
    }
    Ok(())
}

fn config_not_found(config_id: &str) -> ExError {
    ScopeError::ConfigNotFound {
        config_id: config_id.to_string(),
    }
    .into()
}

fn stream_not_found(stream_id: &str) -> ExError {
    ScopeError::StreamNotFound {
        stream_id: stream_id.to_string(),
    }
    .into()
}
