use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::errors::{ExError, ExErrorKind};
use crate::model::EdgeSelectorType;
use crate::selector::Selector;

/// Per-edge row tag of a persisted binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityState {
    Deploy,
    Undeploy,
}

impl EntityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityState::Deploy => "DEPLOY",
            EntityState::Undeploy => "UNDEPLOY",
        }
    }
}

impl FromStr for EntityState {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPLOY" => Ok(EntityState::Deploy),
            "UNDEPLOY" => Ok(EntityState::Undeploy),
            other => Err(ExError::new(ExErrorKind::Serialization)
                .with_op("entity_state")
                .with_message(format!("unknown edge state '{other}'"))),
        }
    }
}

/// Persisted discriminant of a binding
///
/// Follows the owning project's selection mode, not the binding's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingMode {
    #[default]
    Explicit,
    Selector,
}

impl From<EdgeSelectorType> for BindingMode {
    fn from(value: EdgeSelectorType) -> Self {
        match value {
            EdgeSelectorType::Explicit => BindingMode::Explicit,
            EdgeSelectorType::Category => BindingMode::Selector,
        }
    }
}

impl BindingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingMode::Explicit => "EXPLICIT",
            BindingMode::Selector => "SELECTOR",
        }
    }
}

impl FromStr for BindingMode {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXPLICIT" => Ok(BindingMode::Explicit),
            "SELECTOR" => Ok(BindingMode::Selector),
            other => Err(ExError::new(ExErrorKind::Serialization)
                .with_op("binding_mode")
                .with_message(format!("unknown binding mode '{other}'"))),
        }
    }
}

/// Materialized scope of a data-driver configuration or stream
///
/// In explicit mode `service_domain_ids` lists the deploy targets. In
/// selector mode the targets are whatever matches
/// `service_domain_selectors`, minus `exclude_service_domain_ids`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDomainBinding {
    #[serde(default)]
    pub mode: BindingMode,
    #[serde(default)]
    pub service_domain_ids: BTreeSet<String>,
    #[serde(default)]
    pub exclude_service_domain_ids: BTreeSet<String>,
    #[serde(default)]
    pub service_domain_selectors: Selector,
}

impl ServiceDomainBinding {
    pub fn explicit<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: BindingMode::Explicit,
            service_domain_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn selector(selectors: Selector) -> Self {
        Self {
            mode: BindingMode::Selector,
            service_domain_selectors: selectors,
            ..Self::default()
        }
    }

    pub fn with_excludes<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_service_domain_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Drop the fields `mode` does not persist
    ///
    /// Explicit bindings keep only deploy IDs; selector bindings keep
    /// selectors and excludes. After this the binding reads back unchanged
    /// from the binding store.
    pub fn normalize(&mut self) {
        match self.mode {
            BindingMode::Explicit => {
                self.exclude_service_domain_ids.clear();
                self.service_domain_selectors = Selector::default();
            }
            BindingMode::Selector => self.service_domain_ids.clear(),
        }
    }
}

/// Kind of record that owns a materialized binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingOwner {
    DataDriverConfig,
    DataDriverStream,
}

impl BindingOwner {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingOwner::DataDriverConfig => "data_driver_config",
            BindingOwner::DataDriverStream => "data_driver_stream",
        }
    }
}

/// Direction of data flowing through a stream, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamDirection {
    Source,
    Sink,
}

impl StreamDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamDirection::Source => "SOURCE",
            StreamDirection::Sink => "SINK",
        }
    }
}

impl FromStr for StreamDirection {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SOURCE" => Ok(StreamDirection::Source),
            "SINK" => Ok(StreamDirection::Sink),
            other => Err(ExError::new(ExErrorKind::Serialization)
                .with_op("stream_direction")
                .with_message(format!("unknown stream direction '{other}'"))),
        }
    }
}

/// A data-driver configuration: the owner of a materialized binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDriverConfig {
    pub id: String,
    pub tenant_id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub binding: ServiceDomainBinding,
}

impl DataDriverConfig {
    pub fn new(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        project_id: impl Into<String>,
        binding: ServiceDomainBinding,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            project_id: project_id.into(),
            name: String::new(),
            binding,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A data-driver stream: owns a materialized binding like a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDriverStream {
    pub id: String,
    pub tenant_id: String,
    pub project_id: String,
    pub name: String,
    pub direction: StreamDirection,
    #[serde(default)]
    pub binding: ServiceDomainBinding,
}

impl DataDriverStream {
    pub fn new(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        project_id: impl Into<String>,
        direction: StreamDirection,
        binding: ServiceDomainBinding,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            project_id: project_id.into(),
            name: String::new(),
            direction,
            binding,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_set_by_constructor_not_contents() {
        assert_eq!(ServiceDomainBinding::explicit(["e1"]).mode, BindingMode::Explicit);
        let sel: Selector = [("cat", "v1")].into_iter().collect();
        assert_eq!(ServiceDomainBinding::selector(sel).mode, BindingMode::Selector);
        // an explicit binding whose IDs were all pruned is still explicit
        assert_eq!(ServiceDomainBinding::explicit(Vec::<String>::new()).mode, BindingMode::Explicit);
        assert_eq!(BindingMode::from(EdgeSelectorType::Category), BindingMode::Selector);
    }

    #[test]
    fn test_normalize_keeps_persisted_fields_only() {
        let mut explicit = ServiceDomainBinding::explicit(["e1"]).with_excludes(["e2"]);
        explicit.normalize();
        assert_eq!(explicit, ServiceDomainBinding::explicit(["e1"]));

        let sel: Selector = [("cat", "v1")].into_iter().collect();
        let mut selector = ServiceDomainBinding::selector(sel.clone()).with_excludes(["e2"]);
        selector.service_domain_ids.insert("e1".to_string());
        selector.normalize();
        assert!(selector.service_domain_ids.is_empty());
        assert_eq!(selector.service_domain_selectors, sel);
        assert!(selector.exclude_service_domain_ids.contains("e2"));
    }

    #[test]
    fn test_state_and_mode_strings() {
        for state in [EntityState::Deploy, EntityState::Undeploy] {
            assert_eq!(state.as_str().parse::<EntityState>().unwrap(), state);
        }
        for mode in [BindingMode::Explicit, BindingMode::Selector] {
            assert_eq!(mode.as_str().parse::<BindingMode>().unwrap(), mode);
        }
        for direction in [StreamDirection::Source, StreamDirection::Sink] {
            assert_eq!(direction.as_str().parse::<StreamDirection>().unwrap(), direction);
        }
        assert!("deploy".parse::<EntityState>().is_err());
    }
}
