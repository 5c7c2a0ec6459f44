use std::collections::BTreeSet;

use crate::model::{EdgeLabelSnapshot, EdgeSelectorType, Project};

/// Resolve the authoritative edge set of a project
///
/// * Explicit mode returns `project.edge_ids` verbatim. They were validated
///   against existing edges when the project was written.
/// * Category mode returns every edge in `edges` whose labels match the
///   project's selector. An empty selector resolves to no edges.
pub fn resolve_project_scope(project: &Project, edges: &EdgeLabelSnapshot) -> BTreeSet<String> {
    match project.edge_selector_type {
        EdgeSelectorType::Explicit => project.edge_ids.clone(),
        EdgeSelectorType::Category => edges
            .matching(&project.edge_selectors)
            .map(str::to_string)
            .collect(),
    }
}
