#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::BTreeSet;

use common::{add_edge, admin, selector, setup, sink, TENANT};
use fleetscope_core::core_types::TenantScope;
use fleetscope_core::{
    Category, DataDriverConfig, DataDriverStream, Edge, ExErrorKind, Project, ScopedEntity,
    ServiceDomainBinding, StreamDirection,
};
use fleetscope_engine::commands::data_driver::{
    data_driver_config_create, data_driver_config_get, data_driver_stream_create,
};
use fleetscope_engine::commands::entity::{application_get, entity_create};
use fleetscope_engine::commands::labels::{category_upsert, edge_upsert};
use fleetscope_engine::commands::project::{project_create, project_get, project_scope};
use fleetscope_store::ProjectRepo;
use rusqlite::Connection;

const OTHER: &str = "tenant-2";

fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn other_admin() -> TenantScope {
    TenantScope::infra_admin(OTHER)
}

/// Tenant-1 project P {cat=v1} over e1, with application A and config C;
/// tenant-2 owns edge x1 and category `zone`
fn two_tenants() -> Connection {
    let mut conn = setup();
    add_edge(&mut conn, "e1", &[("cat", "v1")]);
    add_edge(&mut conn, "e2", &[("cat", "v2")]);
    project_create(&admin(), &mut conn, Project::category("P", TENANT, selector(&[("cat", "v1")])), &sink()).unwrap();
    let app = ScopedEntity::application("A", TENANT, "P").with_selectors(selector(&[("cat", "v1")]));
    entity_create(&admin(), &mut conn, app, &sink()).unwrap();
    let binding = ServiceDomainBinding::selector(selector(&[("cat", "v1")]));
    data_driver_config_create(&admin(), &mut conn, DataDriverConfig::new("C", TENANT, "P", binding), &sink()).unwrap();

    category_upsert(&other_admin(), &conn, Category::new("zone", OTHER, "zone", vec!["a".into()])).unwrap();
    edge_upsert(&other_admin(), &mut conn, Edge::new("x1", OTHER, "x1")).unwrap();
    conn
}

#[test]
fn test_project_id_collision_across_tenants_rejected() {
    // GIVEN tenant-1's project P resolving to {e1}
    let mut conn = two_tenants();

    // WHEN tenant-2 creates its own P
    let err = project_create(&other_admin(), &mut conn, Project::explicit("P", OTHER, ["x1"]), &sink())
        .unwrap_err();

    // THEN the write is refused and tenant-1 sees exactly what it had
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    let project = project_get(&admin(), &conn, "P").unwrap();
    assert!(project.is_category());
    assert!(project.edge_ids.is_empty());
    assert_eq!(project_scope(&admin(), &conn, "P").unwrap(), ids(&["e1"]));
    assert_eq!(application_get(&admin(), &conn, "A").unwrap().edge_ids, ids(&["e1"]));
    assert!(ProjectRepo::find_project(&conn, OTHER, "P").unwrap().is_none());
}

#[test]
fn test_entity_and_binding_owner_ids_are_global() {
    let mut conn = two_tenants();
    project_create(&other_admin(), &mut conn, Project::explicit("Q", OTHER, ["x1"]), &sink()).unwrap();

    let app = ScopedEntity::application("A", OTHER, "Q").with_edge_ids(["x1"]);
    let err = entity_create(&other_admin(), &mut conn, app, &sink()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);

    let config = DataDriverConfig::new("C", OTHER, "Q", ServiceDomainBinding::explicit(["x1"]));
    let err = data_driver_config_create(&other_admin(), &mut conn, config, &sink()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);

    // a stream cannot reuse a config ID either: both key the same binding rows
    let stream = DataDriverStream::new("C", OTHER, "Q", StreamDirection::Sink, ServiceDomainBinding::explicit(["x1"]));
    let err = data_driver_stream_create(&other_admin(), &mut conn, stream, &sink()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);

    // tenant-1's binding is intact
    let stored = data_driver_config_get(&admin(), &conn, "C").unwrap();
    assert_eq!(stored.binding.service_domain_selectors, selector(&[("cat", "v1")]));
    assert_eq!(application_get(&admin(), &conn, "A").unwrap().edge_ids, ids(&["e1"]));
}

#[test]
fn test_selector_cannot_reference_other_tenant_category() {
    let mut conn = two_tenants();

    // `cat` belongs to tenant-1
    let project = Project::category("Q", OTHER, selector(&[("cat", "v1")]));
    let err = project_create(&other_admin(), &mut conn, project, &sink()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert!(!ProjectRepo::id_exists(&conn, "Q").unwrap());

    // and tenant-1 cannot use tenant-2's `zone`
    let project = Project::category("R", TENANT, selector(&[("zone", "a")]));
    let err = project_create(&admin(), &mut conn, project, &sink()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}
