//! Collaborator seams consumed by the resolvers

use fleetscope_core_types::TenantScope;

use crate::errors::{ExError, ExResult, ScopeError};
use crate::model::Project;

/// Tenant-scoped project lookup
///
/// Implementations return `Ok(None)` for a project that does not exist in
/// `tenant_id`; membership is checked by [`authorized_project`], not here.
pub trait ProjectLookup {
    fn find_project(&self, tenant_id: &str, project_id: &str) -> ExResult<Option<Project>>;
}

/// Load a project the caller is allowed to see
///
/// # Errors
/// * NotFound - no such project in the caller's tenant
/// * PermissionDenied - project exists but the caller is not a member
pub fn authorized_project(
    lookup: &dyn ProjectLookup,
    scope: &TenantScope,
    project_id: &str,
) -> ExResult<Project> {
    let project = lookup
        .find_project(scope.tenant_id(), project_id)?
        .ok_or_else(|| ScopeError::ProjectNotFound {
            project_id: project_id.to_string(),
        })
        .map_err(|e| ExError::from(e).with_request_id(scope.request_id().clone()))?;

    if !scope.is_member(&project.id) {
        return Err(ExError::from(ScopeError::PermissionDenied {
            project_id: project.id,
        })
        .with_request_id(scope.request_id().clone()));
    }

    Ok(project)
}

/// In-memory lookup for tests and one-shot tooling
#[derive(Debug, Default, Clone)]
pub struct StaticProjectLookup {
    projects: Vec<Project>,
}

impl StaticProjectLookup {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }
}

impl ProjectLookup for StaticProjectLookup {
    fn find_project(&self, tenant_id: &str, project_id: &str) -> ExResult<Option<Project>> {
        Ok(self
            .projects
            .iter()
            .find(|p| p.tenant_id == tenant_id && p.id == project_id)
            .cloned())
    }
}
