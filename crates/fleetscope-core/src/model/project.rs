use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::errors::ScopeError;
use crate::selector::Selector;

/// How a project selects its edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeSelectorType {
    /// A fixed list of edge IDs
    Explicit,
    /// Every edge whose labels match the project's selector
    Category,
}

impl EdgeSelectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeSelectorType::Explicit => "Explicit",
            EdgeSelectorType::Category => "Category",
        }
    }
}

impl FromStr for EdgeSelectorType {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // lower case kept for older clients
            "Explicit" | "explicit" => Ok(EdgeSelectorType::Explicit),
            "Category" => Ok(EdgeSelectorType::Category),
            other => Err(ScopeError::InvalidSelectorType {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EdgeSelectorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tenant-scoped grouping of edges
///
/// Exactly one of `edge_ids` (Explicit) or `edge_selectors` (Category) is
/// authoritative, as chosen by `edge_selector_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub edge_selector_type: EdgeSelectorType,
    #[serde(default)]
    pub edge_ids: BTreeSet<String>,
    #[serde(default)]
    pub edge_selectors: Selector,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// New Explicit-mode project over `edge_ids`
    pub fn explicit<I, S>(id: impl Into<String>, tenant_id: impl Into<String>, edge_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: String::new(),
            edge_selector_type: EdgeSelectorType::Explicit,
            edge_ids: edge_ids.into_iter().map(Into::into).collect(),
            edge_selectors: Selector::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// New Category-mode project selecting edges by `selectors`
    pub fn category(id: impl Into<String>, tenant_id: impl Into<String>, selectors: Selector) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: String::new(),
            edge_selector_type: EdgeSelectorType::Category,
            edge_ids: BTreeSet::new(),
            edge_selectors: selectors,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_category(&self) -> bool {
        self.edge_selector_type == EdgeSelectorType::Category
    }

    /// Clear whichever scope field the current mode does not use
    pub fn normalize(&mut self) {
        match self.edge_selector_type {
            EdgeSelectorType::Explicit => self.edge_selectors = Selector::default(),
            EdgeSelectorType::Category => self.edge_ids.clear(),
        }
    }
}
