//! Binding cleanup
//!
//! Restores a materialized [`ServiceDomainBinding`] to consistency with its
//! project's current scope. Run before every persisted `Set` of a binding
//! whose project may have changed.

use std::collections::BTreeSet;

use crate::model::{BindingMode, EdgeLabelSnapshot, EdgeSelectorType, Project, ServiceDomainBinding};
use crate::selector::Selector;

/// Prune a binding in place against `project`
///
/// The binding takes the project's mode first, whatever fields it carries.
///
/// * Explicit project: deploy and exclude IDs are intersected with the
///   project's edge IDs; selectors are cleared.
/// * Category project: deploy IDs are cleared; selectors are narrowed by the
///   project's selector; exclude IDs survive only while the edge still
///   matches the narrowed selector in `edges`.
///
/// Applying it twice is the same as applying it once.
pub fn cleanup_binding(
    project: &Project,
    binding: &mut ServiceDomainBinding,
    edges: &EdgeLabelSnapshot,
) {
    binding.mode = BindingMode::from(project.edge_selector_type);
    match project.edge_selector_type {
        EdgeSelectorType::Explicit => {
            binding
                .service_domain_ids
                .retain(|id| project.edge_ids.contains(id));
            binding
                .exclude_service_domain_ids
                .retain(|id| project.edge_ids.contains(id));
            binding.service_domain_selectors = Selector::default();
        }
        EdgeSelectorType::Category => {
            binding.service_domain_ids.clear();
            binding.service_domain_selectors = binding
                .service_domain_selectors
                .intersect(&project.edge_selectors);

            let matched: BTreeSet<&str> = edges
                .matching(&binding.service_domain_selectors)
                .collect();
            let before = binding.exclude_service_domain_ids.len();
            binding
                .exclude_service_domain_ids
                .retain(|id| matched.contains(id.as_str()));

            let dropped = before - binding.exclude_service_domain_ids.len();
            if dropped > 0 {
                tracing::debug!(
                    project_id = %project.id,
                    dropped,
                    "dropped stale exclude ids from binding"
                );
            }
        }
    }
}
