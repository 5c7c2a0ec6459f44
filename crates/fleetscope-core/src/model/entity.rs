use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::errors::{ExError, ExErrorKind};
use crate::selector::Selector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Application,
    DataStream,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Application => "application",
            EntityKind::DataStream => "data_stream",
        }
    }
}

impl FromStr for EntityKind {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application" => Ok(EntityKind::Application),
            "data_stream" => Ok(EntityKind::DataStream),
            other => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("entity_kind")
                .with_message(format!("unknown entity kind '{other}'"))),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An Application or DataStream as stored
///
/// The scope fields are the caller's request, narrowed at write time against
/// the project. The effective edge set is never stored; see
/// [`crate::scope::resolve_entity_scope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedEntity {
    pub id: String,
    pub tenant_id: String,
    pub project_id: String,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub edge_ids: BTreeSet<String>,
    #[serde(default)]
    pub edge_selectors: Selector,
    #[serde(default)]
    pub exclude_edge_ids: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScopedEntity {
    pub fn new(
        kind: EntityKind,
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            project_id: project_id.into(),
            kind,
            name: String::new(),
            edge_ids: BTreeSet::new(),
            edge_selectors: Selector::default(),
            exclude_edge_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn application(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self::new(EntityKind::Application, id, tenant_id, project_id)
    }

    pub fn data_stream(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self::new(EntityKind::DataStream, id, tenant_id, project_id)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_edge_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edge_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_selectors(mut self, selectors: Selector) -> Self {
        self.edge_selectors = selectors;
        self
    }

    pub fn with_excludes<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_edge_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}
