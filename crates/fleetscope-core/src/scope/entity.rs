use serde::Serialize;
use std::collections::BTreeSet;

use fleetscope_core_types::TenantScope;

use super::project::resolve_project_scope;
use crate::errors::{ExError, ExResult, ScopeError};
use crate::lookup::{authorized_project, ProjectLookup};
use crate::model::{EdgeLabelSnapshot, EdgeSelectorType, Project, ScopedEntity};
use crate::selector::Selector;

/// Effective scope of an Application or DataStream at read time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityScope {
    /// Edges the entity currently applies to
    pub edge_ids: BTreeSet<String>,
    /// Selector actually used to match edges (empty in Explicit mode)
    pub edge_selectors: Selector,
    /// The entity's stored exclude list, unchanged
    pub exclude_edge_ids: BTreeSet<String>,
}

/// Resolve an entity's effective edge set against its project
///
/// The project's mode decides which of the entity's fields is read:
///
/// * Category: the entity's selector is narrowed by the project's selector
///   (same-category intersection) and matched against edges in the project
///   scope. `entity.edge_ids` is ignored.
/// * Explicit: the entity's IDs are intersected with the project's IDs.
///   `entity.edge_selectors` is ignored.
///
/// `entity.exclude_edge_ids` is subtracted last in both modes.
///
/// The caller is responsible for passing the entity's own project; see
/// [`resolve_entity_scope_checked`] for the tenant-aware variant.
pub fn resolve_entity_scope(
    entity: &ScopedEntity,
    project: &Project,
    edges: &EdgeLabelSnapshot,
) -> EntityScope {
    let project_scope = resolve_project_scope(project, edges);

    let (mut edge_ids, edge_selectors) = match project.edge_selector_type {
        EdgeSelectorType::Category => {
            let effective = project.edge_selectors.intersect(&entity.edge_selectors);
            let ids: BTreeSet<String> = project_scope
                .iter()
                .filter(|id| {
                    edges
                        .labels(id)
                        .is_some_and(|labels| effective.matches(labels))
                })
                .cloned()
                .collect();
            (ids, effective)
        }
        EdgeSelectorType::Explicit => {
            let ids: BTreeSet<String> = entity
                .edge_ids
                .intersection(&project_scope)
                .cloned()
                .collect();
            (ids, Selector::default())
        }
    };

    edge_ids.retain(|id| !entity.exclude_edge_ids.contains(id));

    EntityScope {
        edge_ids,
        edge_selectors,
        exclude_edge_ids: entity.exclude_edge_ids.clone(),
    }
}

/// Resolve an entity's scope on behalf of a caller
///
/// Loads the entity's project through `lookup` under `scope`. Fails with
/// NotFound when the entity or its project does not belong to the caller's
/// tenant and with PermissionDenied when the caller is not a member. An
/// empty result is a successful resolution, never an error.
///
/// # Errors
/// * `EntityNotFound` - the entity belongs to another tenant
/// * `ProjectNotFound` - project missing or owned by another tenant
/// * `PermissionDenied` - caller is not a member of the project
pub fn resolve_entity_scope_checked(
    lookup: &dyn ProjectLookup,
    scope: &TenantScope,
    entity: &ScopedEntity,
    edges: &EdgeLabelSnapshot,
) -> ExResult<EntityScope> {
    if entity.tenant_id != scope.tenant_id() {
        return Err(ExError::from(ScopeError::EntityNotFound {
            kind: entity.kind.to_string(),
            entity_id: entity.id.clone(),
        })
        .with_request_id(scope.request_id().clone()));
    }

    let project = authorized_project(lookup, scope, &entity.project_id)?;
    Ok(resolve_entity_scope(entity, &project, edges))
}
