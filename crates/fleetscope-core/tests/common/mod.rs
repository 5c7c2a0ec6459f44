use std::collections::BTreeSet;

use fleetscope_core::{EdgeLabelSnapshot, Labels, Selector};

/// One snapshot row: an edge and its labels
#[allow(dead_code)]
pub fn edge(id: &str, labels: &[(&'static str, &'static str)]) -> (String, Labels) {
    (id.to_string(), labels.iter().copied().collect())
}

#[allow(dead_code)]
pub fn snapshot(rows: Vec<(String, Labels)>) -> EdgeLabelSnapshot {
    rows.into_iter().collect()
}

#[allow(dead_code)]
pub fn selector(terms: &[(&'static str, &'static str)]) -> Selector {
    terms.iter().copied().collect()
}

#[allow(dead_code)]
pub fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
