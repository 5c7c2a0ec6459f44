use std::collections::{BTreeSet, HashSet};

use crate::errors::{Result, ScopeError};
use crate::model::{Category, EdgeSelectorType, Project, ScopedEntity};
use crate::selector::Selector;

/// Validate and normalize a category definition in place
///
/// Name and values are trimmed. Values must be non-empty and unique
/// ignoring case, and there must be at least one.
///
/// # Errors
/// * `InvalidCategory` - empty name, no values, an empty value, or a
///   case-insensitive duplicate
pub fn validate_category(category: &mut Category) -> Result<()> {
    category.name = category.name.trim().to_string();
    if category.name.is_empty() {
        return Err(ScopeError::InvalidCategory {
            reason: "name must not be empty".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut values = Vec::with_capacity(category.values.len());
    for raw in &category.values {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ScopeError::InvalidCategory {
                reason: "values must not be empty".to_string(),
            });
        }
        if !seen.insert(value.to_lowercase()) {
            return Err(ScopeError::InvalidCategory {
                reason: format!("duplicate value '{value}'"),
            });
        }
        values.push(value.to_string());
    }

    if values.is_empty() {
        return Err(ScopeError::InvalidCategory {
            reason: "at least one value is required".to_string(),
        });
    }

    category.values = values;
    Ok(())
}

/// Check that every selector term names an existing category value
///
/// # Errors
/// * `CategoryNotFound` - the category is unknown
/// * `CategoryValueNotFound` - the category exists but lacks the value
pub fn validate_selector_terms(selector: &Selector, categories: &[Category]) -> Result<()> {
    for (category_id, value) in selector.iter() {
        let category = categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| ScopeError::CategoryNotFound {
                category_id: category_id.to_string(),
            })?;
        if !category.allows(value) {
            return Err(ScopeError::CategoryValueNotFound {
                category_id: category_id.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Normalize a project before it is persisted
///
/// Clears the field the mode does not use. In Explicit mode every edge ID
/// must be one of `known_edges`.
///
/// # Errors
/// * `EdgeNotFound` - first explicit edge ID that is not a known edge
pub fn normalize_project(project: &mut Project, known_edges: &BTreeSet<String>) -> Result<()> {
    project.normalize();

    if project.edge_selector_type == EdgeSelectorType::Explicit {
        if let Some(missing) = project.edge_ids.iter().find(|id| !known_edges.contains(*id)) {
            return Err(ScopeError::EdgeNotFound {
                edge_id: missing.clone(),
            });
        }
    }

    Ok(())
}

/// Narrow a scoped entity's fields to its project before it is persisted
///
/// Explicit project: entity IDs must all belong to the project and
/// selectors are cleared. Category project: entity IDs are cleared and
/// every selector term must exist. Excludes are stored as given.
///
/// # Errors
/// * `EdgesOutsideProject` - lists every offending edge ID, sorted
/// * `CategoryNotFound` / `CategoryValueNotFound` - unknown selector term
pub fn validate_entity_against_project(
    entity: &mut ScopedEntity,
    project: &Project,
    categories: &[Category],
) -> Result<()> {
    match project.edge_selector_type {
        EdgeSelectorType::Explicit => {
            let outside: Vec<String> = entity
                .edge_ids
                .difference(&project.edge_ids)
                .cloned()
                .collect();
            if !outside.is_empty() {
                return Err(ScopeError::EdgesOutsideProject {
                    project_id: project.id.clone(),
                    edge_ids: outside,
                });
            }
            entity.edge_selectors = Selector::default();
        }
        EdgeSelectorType::Category => {
            entity.edge_ids.clear();
            validate_selector_terms(&entity.edge_selectors, categories)?;
        }
    }
    Ok(())
}

/// Reject an update that moves an entity to another project
pub fn check_project_unchanged(existing: &ScopedEntity, requested: &ScopedEntity) -> Result<()> {
    if existing.project_id != requested.project_id {
        return Err(ScopeError::ProjectIdImmutable {
            entity_id: existing.id.clone(),
            existing: existing.project_id.clone(),
            requested: requested.project_id.clone(),
        });
    }
    Ok(())
}
