//! Category selectors and edge label sets
//!
//! A [`Selector`] is AND'ed across distinct categories and OR'ed across the
//! values listed for one category. An empty selector matches nothing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::model::CategoryValue;

type ValueMap = BTreeMap<String, BTreeSet<String>>;

/// Set of category values assigned to one edge
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels(Arc<ValueMap>);

/// Set of category values used to select edges by label
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CategoryValue>", into = "Vec<CategoryValue>")]
pub struct Selector(ValueMap);

// === Selector ===

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category_id: impl Into<String>, value: impl Into<String>) {
        self.0
            .entry(category_id.into())
            .or_default()
            .insert(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of (category, value) terms
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self, category_id: &str) -> Option<&BTreeSet<String>> {
        self.0.get(category_id)
    }

    pub fn contains(&self, category_id: &str, value: &str) -> bool {
        self.0
            .get(category_id)
            .is_some_and(|values| values.contains(value))
    }

    /// Terms in deterministic (category, value) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(category, values)| {
            values
                .iter()
                .map(move |value| (category.as_str(), value.as_str()))
        })
    }

    pub fn to_category_values(&self) -> Vec<CategoryValue> {
        self.iter()
            .map(|(category, value)| CategoryValue::new(category, value))
            .collect()
    }

    /// Whether an edge carrying `labels` is selected
    ///
    /// Every category of the selector must be satisfied by at least one of
    /// the edge's labels for that category.
    pub fn matches(&self, labels: &Labels) -> bool {
        if self.0.is_empty() {
            return false;
        }

        self.0.iter().all(|(category, wanted)| {
            labels
                .0
                .get(category)
                .is_some_and(|assigned| !assigned.is_disjoint(wanted))
        })
    }

    /// Same-category intersection of two selectors
    ///
    /// For a category present in both, only the shared values survive. A
    /// category present in just one side passes through unchanged. If either
    /// side is empty, or a shared category ends up with no common value, the
    /// result is the empty selector, which selects nothing.
    pub fn intersect(&self, other: &Selector) -> Selector {
        if self.is_empty() || other.is_empty() {
            return Selector::default();
        }

        let mut out = ValueMap::new();
        for (category, values) in &self.0 {
            match other.0.get(category) {
                Some(theirs) => {
                    let shared: BTreeSet<String> = values.intersection(theirs).cloned().collect();
                    if shared.is_empty() {
                        return Selector::default();
                    }
                    out.insert(category.clone(), shared);
                }
                None => {
                    out.insert(category.clone(), values.clone());
                }
            }
        }
        for (category, values) in &other.0 {
            out.entry(category.clone()).or_insert_with(|| values.clone());
        }

        Selector(out)
    }
}

impl FromIterator<CategoryValue> for Selector {
    fn from_iter<T: IntoIterator<Item = CategoryValue>>(iter: T) -> Self {
        let mut selector = Selector::default();
        for cv in iter {
            selector.insert(cv.category_id, cv.value);
        }
        selector
    }
}

impl FromIterator<(&'static str, &'static str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(category, value)| CategoryValue::new(category, value))
            .collect()
    }
}

impl From<Vec<CategoryValue>> for Selector {
    fn from(values: Vec<CategoryValue>) -> Self {
        values.into_iter().collect()
    }
}

impl From<Selector> for Vec<CategoryValue> {
    fn from(selector: Selector) -> Self {
        selector.to_category_values()
    }
}

// === Labels ===

impl Labels {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, category_id: &str, value: &str) -> bool {
        self.0
            .get(category_id)
            .is_some_and(|values| values.contains(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(category, values)| {
            values
                .iter()
                .map(move |value| (category.as_str(), value.as_str()))
        })
    }

    pub fn to_category_values(&self) -> Vec<CategoryValue> {
        self.iter()
            .map(|(category, value)| CategoryValue::new(category, value))
            .collect()
    }
}

impl FromIterator<CategoryValue> for Labels {
    fn from_iter<T: IntoIterator<Item = CategoryValue>>(iter: T) -> Self {
        let mut map = ValueMap::new();
        for cv in iter {
            map.entry(cv.category_id).or_default().insert(cv.value);
        }
        Self(Arc::new(map))
    }
}

impl FromIterator<(&'static str, &'static str)> for Labels {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(category, value)| CategoryValue::new(category, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selector_matches_nothing() {
        let labels: Labels = [("cat", "v1")].into_iter().collect();
        assert!(!Selector::default().matches(&labels));
    }

    #[test]
    fn test_unlabeled_edge_matches_nothing() {
        let selector: Selector = [("cat", "v1")].into_iter().collect();
        assert!(!selector.matches(&Labels::default()));
    }

    #[test]
    fn test_or_within_category() {
        let selector: Selector = [("cat", "v1"), ("cat", "v2")].into_iter().collect();
        let v2: Labels = [("cat", "v2")].into_iter().collect();
        let v3: Labels = [("cat", "v3")].into_iter().collect();

        assert!(selector.matches(&v2));
        assert!(!selector.matches(&v3));
    }

    #[test]
    fn test_and_across_categories() {
        let selector: Selector = [("cat", "v1"), ("env", "prod")].into_iter().collect();
        let both: Labels = [("cat", "v1"), ("env", "prod")].into_iter().collect();
        let one: Labels = [("cat", "v1"), ("env", "dev")].into_iter().collect();

        assert!(selector.matches(&both));
        assert!(!selector.matches(&one));
    }

    #[test]
    fn test_extra_labels_do_not_prevent_match() {
        let selector: Selector = [("cat", "v1")].into_iter().collect();
        let labels: Labels = [("cat", "v1"), ("floor", "2"), ("env", "dev")]
            .into_iter()
            .collect();
        assert!(selector.matches(&labels));
    }

    #[test]
    fn test_intersect_shared_category_keeps_common_values() {
        let project: Selector = [("cat", "v1"), ("cat", "v2")].into_iter().collect();
        let entity: Selector = [("cat", "v2"), ("cat", "v3")].into_iter().collect();

        let out = project.intersect(&entity);
        assert_eq!(out, [("cat", "v2")].into_iter().collect());
    }

    #[test]
    fn test_intersect_passes_through_unshared_categories() {
        let project: Selector = [("cat", "v1")].into_iter().collect();
        let entity: Selector = [("cat", "v1"), ("env", "prod")].into_iter().collect();

        let out = project.intersect(&entity);
        assert!(out.contains("cat", "v1"));
        assert!(out.contains("env", "prod"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_intersect_disjoint_category_selects_nothing() {
        let project: Selector = [("cat", "v1"), ("env", "prod")].into_iter().collect();
        let entity: Selector = [("cat", "v2")].into_iter().collect();

        let out = project.intersect(&entity);
        assert!(out.is_empty());
    }

    #[test]
    fn test_intersect_with_empty_is_empty() {
        let project: Selector = [("cat", "v1")].into_iter().collect();
        assert!(project.intersect(&Selector::default()).is_empty());
        assert!(Selector::default().intersect(&project).is_empty());
    }

    #[test]
    fn test_serde_as_category_value_list() {
        let selector: Selector = [("env", "prod"), ("cat", "v1")].into_iter().collect();
        let json = serde_json::to_value(&selector).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": "cat", "value": "v1"},
                {"id": "env", "value": "prod"}
            ])
        );

        let back: Selector = serde_json::from_value(json).unwrap();
        assert_eq!(back, selector);
    }
}
