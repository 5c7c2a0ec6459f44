//! Change notifications
//!
//! Every successful write produces one [`EntityEvent`]. Events are handed to
//! a [`ChangeSink`] after commit; delivery is at-most-once and a sink may
//! drop an event rather than block the write that produced it.

use serde::Serialize;

use crate::model::{
    BindingOwner, DataDriverConfig, DataDriverStream, Project, ScopedEntity, ServiceDomainBinding,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A committed change, one variant per entity kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EntityEvent {
    Project {
        change: ChangeKind,
        project: Project,
    },
    Application {
        change: ChangeKind,
        entity: ScopedEntity,
    },
    DataStream {
        change: ChangeKind,
        entity: ScopedEntity,
    },
    ServiceDomainBinding {
        change: ChangeKind,
        owner: BindingOwner,
        owner_id: String,
        binding: ServiceDomainBinding,
    },
}

impl EntityEvent {
    /// Event for a scoped entity, tagged by its kind
    pub fn scoped(change: ChangeKind, entity: ScopedEntity) -> Self {
        match entity.kind {
            crate::model::EntityKind::Application => EntityEvent::Application { change, entity },
            crate::model::EntityKind::DataStream => EntityEvent::DataStream { change, entity },
        }
    }

    pub fn binding(change: ChangeKind, config: &DataDriverConfig) -> Self {
        EntityEvent::ServiceDomainBinding {
            change,
            owner: BindingOwner::DataDriverConfig,
            owner_id: config.id.clone(),
            binding: config.binding.clone(),
        }
    }

    pub fn stream_binding(change: ChangeKind, stream: &DataDriverStream) -> Self {
        EntityEvent::ServiceDomainBinding {
            change,
            owner: BindingOwner::DataDriverStream,
            owner_id: stream.id.clone(),
            binding: stream.binding.clone(),
        }
    }

    pub fn change(&self) -> ChangeKind {
        match self {
            EntityEvent::Project { change, .. }
            | EntityEvent::Application { change, .. }
            | EntityEvent::DataStream { change, .. }
            | EntityEvent::ServiceDomainBinding { change, .. } => *change,
        }
    }

    /// ID of the changed entity
    pub fn subject_id(&self) -> &str {
        match self {
            EntityEvent::Project { project, .. } => &project.id,
            EntityEvent::Application { entity, .. } | EntityEvent::DataStream { entity, .. } => {
                &entity.id
            }
            EntityEvent::ServiceDomainBinding { owner_id, .. } => owner_id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            EntityEvent::Project { .. } => "project",
            EntityEvent::Application { .. } => "application",
            EntityEvent::DataStream { .. } => "data_stream",
            EntityEvent::ServiceDomainBinding { .. } => "service_domain_binding",
        }
    }
}

/// Outcome of handing an event to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Enqueued,
    Dropped,
}

/// Destination for committed change events
///
/// `publish` must not block and must not fail the caller.
pub trait ChangeSink: Send + Sync {
    fn publish(&self, event: EntityEvent) -> Delivery;
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChangeSink;

impl ChangeSink for NoopChangeSink {
    fn publish(&self, _event: EntityEvent) -> Delivery {
        Delivery::Dropped
    }
}
