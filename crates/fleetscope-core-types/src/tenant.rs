//! Explicit caller context
//!
//! Every resolver and store call that touches tenant data receives a
//! `TenantScope`. Nothing in fleetscope reads tenant or role information from
//! ambient state.

use std::collections::BTreeSet;

use crate::correlation::RequestId;

/// Role of the caller within its tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Operator with visibility over every project of the tenant
    InfraAdmin,
    /// Regular user, restricted to the projects listed in the scope
    ProjectUser,
}

/// The caller's tenant, role and project memberships
#[derive(Debug, Clone)]
pub struct TenantScope {
    tenant_id: String,
    role: Role,
    project_ids: BTreeSet<String>,
    request_id: RequestId,
}

impl TenantScope {
    /// Scope for an infra admin of `tenant_id`
    pub fn infra_admin(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            role: Role::InfraAdmin,
            project_ids: BTreeSet::new(),
            request_id: RequestId::new(),
        }
    }

    /// Scope for a project user who belongs to `project_ids`
    pub fn project_user<I, S>(tenant_id: impl Into<String>, project_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tenant_id: tenant_id.into(),
            role: Role::ProjectUser,
            project_ids: project_ids.into_iter().map(Into::into).collect(),
            request_id: RequestId::new(),
        }
    }

    /// Replace the generated request id with one supplied by the caller
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Project memberships listed for a project user (empty for admins)
    pub fn project_ids(&self) -> &BTreeSet<String> {
        &self.project_ids
    }

    /// Whether the caller may read or write resources of `project_id`
    ///
    /// Infra admins are members of every project of their tenant. Tenant
    /// ownership of the project itself is checked by the caller.
    pub fn is_member(&self, project_id: &str) -> bool {
        match self.role {
            Role::InfraAdmin => true,
            Role::ProjectUser => self.project_ids.contains(project_id),
        }
    }
}
