use serde::{Deserialize, Serialize};

/// A choice of one value from a category, e.g. `(airport, SFO)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryValue {
    /// Category ID
    #[serde(rename = "id")]
    pub category_id: String,

    /// One of the category's allowed values
    pub value: String,
}

impl CategoryValue {
    pub fn new(category_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.category_id, self.value)
    }
}

/// A named classification axis with its allowed values
///
/// Categories are owned by the label-management collaborator; this engine
/// only validates them on write and reads them to resolve selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub purpose: String,
    pub values: Vec<String>,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        name: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            purpose: String::new(),
            values,
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
