use std::collections::BTreeMap;

use crate::selector::{Labels, Selector};

/// A service domain: a managed remote node that workloads can target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub labels: Labels,
}

impl Edge {
    pub fn new(id: impl Into<String>, tenant_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            labels: Labels::default(),
        }
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

/// Point-in-time view of every edge of a tenant and its current labels
///
/// Resolvers only ever read from a snapshot handed to them; they never
/// fetch or cache labels themselves.
#[derive(Debug, Clone, Default)]
pub struct EdgeLabelSnapshot {
    edges: BTreeMap<String, Labels>,
}

impl EdgeLabelSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edge_id: impl Into<String>, labels: Labels) {
        self.edges.insert(edge_id.into(), labels);
    }

    pub fn labels(&self, edge_id: &str) -> Option<&Labels> {
        self.edges.get(edge_id)
    }

    pub fn contains(&self, edge_id: &str) -> bool {
        self.edges.contains_key(edge_id)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Labels)> {
        self.edges.iter().map(|(id, labels)| (id.as_str(), labels))
    }

    /// IDs of every edge whose labels satisfy `selector`
    pub fn matching<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(_, labels)| selector.matches(labels))
            .map(|(id, _)| id)
    }
}

impl FromIterator<Edge> for EdgeLabelSnapshot {
    fn from_iter<T: IntoIterator<Item = Edge>>(iter: T) -> Self {
        Self {
            edges: iter.into_iter().map(|e| (e.id, e.labels)).collect(),
        }
    }
}

impl FromIterator<(String, Labels)> for EdgeLabelSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, Labels)>>(iter: T) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}
