pub mod validation;

pub use validation::{
    check_project_unchanged, normalize_project, validate_category, validate_entity_against_project,
    validate_selector_terms,
};
