#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{add_edge, setup_db, TENANT};
use fleetscope_core::{Category, ExErrorKind, Labels};
use fleetscope_store::LabelRepo;

#[test]
fn test_snapshot_includes_unlabelled_edges() {
    let conn = setup_db();
    add_edge(&conn, "e1", &[("cat", "v1"), ("region", "us")]);
    add_edge(&conn, "e2", &[]);

    let snapshot = LabelRepo::label_snapshot(&conn, TENANT).unwrap();

    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.labels("e1").unwrap().contains("region", "us"));
    assert!(snapshot.labels("e2").unwrap().is_empty());
}

#[test]
fn test_snapshot_is_tenant_scoped() {
    let conn = setup_db();
    add_edge(&conn, "e1", &[("cat", "v1")]);
    let other = fleetscope_core::Edge::new("x1", "tenant-2", "x1");
    LabelRepo::upsert_edge(&conn, &other).unwrap();

    let snapshot = LabelRepo::label_snapshot(&conn, TENANT).unwrap();
    assert!(snapshot.contains("e1"));
    assert!(!snapshot.contains("x1"));
}

#[test]
fn test_set_edge_labels_replaces_wholesale() {
    let conn = setup_db();
    add_edge(&conn, "e1", &[("cat", "v1"), ("region", "us")]);

    let labels: Labels = [("cat", "v2")].into_iter().collect();
    LabelRepo::set_edge_labels(&conn, "e1", &labels).unwrap();

    let edge = LabelRepo::get_edge(&conn, "e1").unwrap().unwrap();
    assert_eq!(edge.labels, labels);
}

#[test]
fn test_unknown_label_is_not_found() {
    let conn = setup_db();
    add_edge(&conn, "e1", &[]);

    let unknown_value: Labels = [("cat", "v9")].into_iter().collect();
    let err = LabelRepo::set_edge_labels(&conn, "e1", &unknown_value).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert!(err.message().contains("cat:v9"));

    let unknown_edge = LabelRepo::set_edge_labels(&conn, "nope", &Labels::default()).unwrap_err();
    assert_eq!(unknown_edge.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_resolve_distinguishes_category_from_value() {
    let conn = setup_db();

    assert!(LabelRepo::resolve_category_value(&conn, TENANT, "cat", "v1").is_ok());

    let missing_value = LabelRepo::resolve_category_value(&conn, TENANT, "cat", "v9").unwrap_err();
    assert!(missing_value.message().contains("Category value not found"));

    let missing_category = LabelRepo::resolve_category_value(&conn, TENANT, "zone", "v1").unwrap_err();
    assert_eq!(missing_category.entity_id(), Some("zone"));
    assert!(!missing_category.message().contains("value"));
}

#[test]
fn test_category_values_are_tenant_scoped() {
    let conn = setup_db();

    let err = LabelRepo::resolve_category_value(&conn, "tenant-2", "cat", "v1").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert!(!err.message().contains("value"));

    // an edge of tenant-2 cannot carry tenant-1's labels
    let other = fleetscope_core::Edge::new("x1", "tenant-2", "x1")
        .with_labels([("cat", "v1")].into_iter().collect::<Labels>());
    let err = LabelRepo::upsert_edge(&conn, &other).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_foreign_ids_are_not_overwritten() {
    let conn = setup_db();
    add_edge(&conn, "e1", &[("cat", "v1")]);

    let edge = fleetscope_core::Edge::new("e1", "tenant-2", "stolen");
    let err = LabelRepo::upsert_edge(&conn, &edge).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);

    let category = Category::new("cat", "tenant-2", "cat", vec!["x".into()]);
    let err = LabelRepo::upsert_category(&conn, &category).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);

    let stored = LabelRepo::get_edge(&conn, "e1").unwrap().unwrap();
    assert_eq!(stored.tenant_id, TENANT);
    assert!(stored.labels.contains("cat", "v1"));
    assert_eq!(
        LabelRepo::get_category(&conn, "cat").unwrap().unwrap().values,
        vec!["v1".to_string(), "v2".to_string()]
    );
}

#[test]
fn test_category_update_keeps_surviving_value_keys() {
    let conn = setup_db();
    let before = LabelRepo::resolve_category_value(&conn, TENANT, "cat", "v1").unwrap();
    add_edge(&conn, "e1", &[("cat", "v1")]);
    add_edge(&conn, "e2", &[("cat", "v2")]);

    // Drop v2, keep v1, add v3
    let category = Category::new("cat", TENANT, "cat", vec!["v1".into(), "v3".into()]);
    LabelRepo::upsert_category(&conn, &category).unwrap();

    assert_eq!(LabelRepo::resolve_category_value(&conn, TENANT, "cat", "v1").unwrap(), before);
    let snapshot = LabelRepo::label_snapshot(&conn, TENANT).unwrap();
    assert!(snapshot.labels("e1").unwrap().contains("cat", "v1"));
    assert!(snapshot.labels("e2").unwrap().is_empty());
    assert_eq!(
        LabelRepo::get_category(&conn, "cat").unwrap().unwrap().values,
        vec!["v1".to_string(), "v3".to_string()]
    );
}
