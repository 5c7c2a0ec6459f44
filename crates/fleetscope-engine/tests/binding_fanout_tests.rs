#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::BTreeSet;

use common::{add_edge, admin, selector, setup, sink, TENANT};
use fleetscope_core::{
    BindingMode, BindingOwner, ChangeKind, DataDriverConfig, DataDriverStream, EntityEvent,
    ExErrorKind, Project, ServiceDomainBinding, StreamDirection,
};
use fleetscope_engine::commands::data_driver::{
    data_driver_config_create, data_driver_config_delete, data_driver_config_get,
    data_driver_config_update, data_driver_stream_create, data_driver_stream_delete,
    data_driver_stream_get, data_driver_stream_update,
};
use fleetscope_engine::commands::project::{project_create, project_get, project_update};
use fleetscope_engine::ChangeQueue;
use fleetscope_store::{ConfigRepo, ServiceDomainBindingService, SqliteBindingStore};

fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_explicit_binding_pruned_on_project_update() {
    // GIVEN an Explicit project {e1,e2,e3} and a binding on {e1,e2}
    let mut conn = setup();
    for id in ["e1", "e2", "e3"] {
        add_edge(&mut conn, id, &[]);
    }
    project_create(&admin(), &mut conn, Project::explicit("P", TENANT, ["e1", "e2", "e3"]), &sink()).unwrap();
    let config = DataDriverConfig::new("C", TENANT, "P", ServiceDomainBinding::explicit(["e1", "e2"]));
    data_driver_config_create(&admin(), &mut conn, config, &sink()).unwrap();

    // WHEN the project shrinks to {e2,e3}
    let update = project_update(&admin(), &mut conn, Project::explicit("P", TENANT, ["e2", "e3"]), &sink()).unwrap();

    // THEN the stored binding only keeps e2
    assert_eq!(update.configs.len(), 1);
    let stored = data_driver_config_get(&admin(), &conn, "C").unwrap();
    assert_eq!(stored.binding.service_domain_ids, ids(&["e2"]));
    assert_eq!(stored.binding.mode, BindingMode::Explicit);
}

#[test]
fn test_selector_binding_narrowed_and_excludes_dropped() {
    // GIVEN a Category project {cat=v1} and e1, e2 both cat=v1 in different regions
    let mut conn = setup();
    add_edge(&mut conn, "e1", &[("cat", "v1"), ("region", "us")]);
    add_edge(&mut conn, "e2", &[("cat", "v1"), ("region", "eu")]);
    let project = Project::category("P", TENANT, selector(&[("cat", "v1"), ("region", "us")]));
    project_create(&admin(), &mut conn, project, &sink()).unwrap();

    // AND a binding selecting region=us that excludes e1
    let binding = ServiceDomainBinding::selector(selector(&[("region", "us")])).with_excludes(["e1"]);
    let created = data_driver_config_create(&admin(), &mut conn, DataDriverConfig::new("C", TENANT, "P", binding), &sink()).unwrap();
    assert_eq!(created.binding.service_domain_selectors, selector(&[("cat", "v1"), ("region", "us")]));
    assert_eq!(created.binding.exclude_service_domain_ids, ids(&["e1"]));

    // WHEN the project moves to region=eu
    let moved = Project::category("P", TENANT, selector(&[("cat", "v1"), ("region", "eu")]));
    project_update(&admin(), &mut conn, moved, &sink()).unwrap();

    // THEN the binding selects nothing and the stale exclude is gone
    let stored = data_driver_config_get(&admin(), &conn, "C").unwrap();
    assert_eq!(stored.binding.mode, BindingMode::Selector);
    assert!(stored.binding.service_domain_selectors.is_empty());
    assert!(stored.binding.exclude_service_domain_ids.is_empty());
}

#[test]
fn test_failed_project_update_rolls_back_bindings() {
    let mut conn = setup();
    for id in ["e1", "e2"] {
        add_edge(&mut conn, id, &[("cat", "v1")]);
    }
    project_create(&admin(), &mut conn, Project::explicit("P", TENANT, ["e1", "e2"]), &sink()).unwrap();
    let config = DataDriverConfig::new("C", TENANT, "P", ServiceDomainBinding::explicit(["e1", "e2"]));
    data_driver_config_create(&admin(), &mut conn, config, &sink()).unwrap();

    // WHEN the update names an unknown category value
    let broken = Project::category("P", TENANT, selector(&[("cat", "nope")]));
    let err = project_update(&admin(), &mut conn, broken, &sink()).unwrap_err();

    // THEN nothing changed
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    let project = project_get(&admin(), &conn, "P").unwrap();
    assert!(!project.is_category());
    assert_eq!(project.edge_ids, ids(&["e1", "e2"]));
    let stored = data_driver_config_get(&admin(), &conn, "C").unwrap();
    assert_eq!(stored.binding.service_domain_ids, ids(&["e1", "e2"]));
}

#[test]
fn test_config_with_unknown_selector_writes_nothing() {
    let mut conn = setup();
    add_edge(&mut conn, "e1", &[("cat", "v1")]);
    project_create(&admin(), &mut conn, Project::category("P", TENANT, selector(&[("cat", "v1")])), &sink()).unwrap();

    // zone is not a category of the tenant and survives the project intersection
    let binding = ServiceDomainBinding::selector(selector(&[("zone", "a")]));
    let err = data_driver_config_create(&admin(), &mut conn, DataDriverConfig::new("C", TENANT, "P", binding), &sink())
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(ConfigRepo::find_config(&conn, TENANT, "C").unwrap().is_none());
}

#[test]
fn test_config_project_cannot_change() {
    let mut conn = setup();
    add_edge(&mut conn, "e1", &[]);
    for id in ["P", "Q"] {
        project_create(&admin(), &mut conn, Project::explicit(id, TENANT, ["e1"]), &sink()).unwrap();
    }
    let config = DataDriverConfig::new("C", TENANT, "P", ServiceDomainBinding::explicit(["e1"]));
    data_driver_config_create(&admin(), &mut conn, config, &sink()).unwrap();

    let moved = DataDriverConfig::new("C", TENANT, "Q", ServiceDomainBinding::explicit(["e1"]));
    let err = data_driver_config_update(&admin(), &mut conn, moved, &sink()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(data_driver_config_get(&admin(), &conn, "C").unwrap().project_id, "P");
}

#[test]
fn test_project_writes_need_infra_admin() {
    use fleetscope_core::core_types::TenantScope;

    let mut conn = setup();
    add_edge(&mut conn, "e1", &[]);
    let user = TenantScope::project_user(TENANT, ["P"]);

    let err = project_create(&user, &mut conn, Project::explicit("P", TENANT, ["e1"]), &sink()).unwrap_err();
    assert!(err.is_permission_denied());
}

#[test]
fn test_change_events_follow_commit() {
    let mut conn = setup();
    for id in ["e1", "e2"] {
        add_edge(&mut conn, id, &[]);
    }
    let (queue, mut rx) = ChangeQueue::bounded(16);

    project_create(&admin(), &mut conn, Project::explicit("P", TENANT, ["e1", "e2"]), &queue).unwrap();
    let config = DataDriverConfig::new("C", TENANT, "P", ServiceDomainBinding::explicit(["e1", "e2"]));
    data_driver_config_create(&admin(), &mut conn, config, &queue).unwrap();
    project_update(&admin(), &mut conn, Project::explicit("P", TENANT, ["e1"]), &queue).unwrap();
    data_driver_config_delete(&admin(), &mut conn, "C", &queue).unwrap();

    let events: Vec<(&'static str, ChangeKind, String)> = rx
        .drain()
        .iter()
        .map(|e| (e.kind_name(), e.change(), e.subject_id().to_string()))
        .collect();
    assert_eq!(
        events,
        vec![
            ("project", ChangeKind::Created, "P".to_string()),
            ("service_domain_binding", ChangeKind::Created, "C".to_string()),
            ("project", ChangeKind::Updated, "P".to_string()),
            ("service_domain_binding", ChangeKind::Updated, "C".to_string()),
            ("service_domain_binding", ChangeKind::Deleted, "C".to_string()),
        ]
    );

    // A failed write publishes nothing
    let err = project_update(&admin(), &mut conn, Project::explicit("P", TENANT, ["e9"]), &queue);
    assert!(err.is_err());
    assert!(rx.try_recv().is_none());
    assert_eq!(queue.stats().dropped, 0);
}

#[test]
fn test_binding_event_carries_cleaned_binding() {
    let mut conn = setup();
    for id in ["e1", "e2"] {
        add_edge(&mut conn, id, &[]);
    }
    let (queue, mut rx) = ChangeQueue::bounded(16);
    project_create(&admin(), &mut conn, Project::explicit("P", TENANT, ["e1"]), &queue).unwrap();

    // e2 is an edge of the tenant but not of the project
    let config = DataDriverConfig::new("C", TENANT, "P", ServiceDomainBinding::explicit(["e1", "e2"]));
    data_driver_config_create(&admin(), &mut conn, config, &queue).unwrap();

    let last = rx.drain().pop().unwrap();
    match last {
        EntityEvent::ServiceDomainBinding { binding, .. } => {
            assert_eq!(binding.service_domain_ids, ids(&["e1"]));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_explicit_binding_with_excludes_reads_back_as_returned() {
    // GIVEN an Explicit project {e1,e2}
    let mut conn = setup();
    for id in ["e1", "e2"] {
        add_edge(&mut conn, id, &[]);
    }
    project_create(&admin(), &mut conn, Project::explicit("P", TENANT, ["e1", "e2"]), &sink()).unwrap();

    // WHEN a config deploys e1 and also lists an exclude
    let binding = ServiceDomainBinding::explicit(["e1"]).with_excludes(["e2"]);
    let created = data_driver_config_create(&admin(), &mut conn, DataDriverConfig::new("C", TENANT, "P", binding), &sink()).unwrap();

    // THEN what came back is exactly what is stored
    let stored = data_driver_config_get(&admin(), &conn, "C").unwrap();
    assert_eq!(created.binding, stored.binding);
    assert!(stored.binding.exclude_service_domain_ids.is_empty());

    // AND pruning every deploy ID keeps the binding explicit
    let update = project_update(&admin(), &mut conn, Project::explicit("P", TENANT, ["e2"]), &sink()).unwrap();
    let stored = data_driver_config_get(&admin(), &conn, "C").unwrap();
    assert_eq!(update.configs[0].binding, stored.binding);
    assert_eq!(stored.binding.mode, BindingMode::Explicit);
    assert!(stored.binding.service_domain_ids.is_empty());
}

#[test]
fn test_binding_mode_follows_project_not_contents() {
    // GIVEN a Category project and a config sent with explicit IDs only
    let mut conn = setup();
    add_edge(&mut conn, "e1", &[("cat", "v1")]);
    project_create(&admin(), &mut conn, Project::category("P", TENANT, selector(&[("cat", "v1")])), &sink()).unwrap();
    let config = DataDriverConfig::new("C", TENANT, "P", ServiceDomainBinding::explicit(["e1"]));
    let created = data_driver_config_create(&admin(), &mut conn, config, &sink()).unwrap();

    // THEN it is stored in selector mode with nothing selected
    assert_eq!(created.binding.mode, BindingMode::Selector);
    let stored = SqliteBindingStore::new(TENANT).get(&conn, "C").unwrap();
    assert_eq!(stored, created.binding);
    assert!(stored.service_domain_ids.is_empty());
}

#[test]
fn test_stream_binding_lifecycle_and_fixed_direction() {
    let mut conn = setup();
    for id in ["e1", "e2", "e3"] {
        add_edge(&mut conn, id, &[]);
    }
    project_create(&admin(), &mut conn, Project::explicit("P", TENANT, ["e1", "e2"]), &sink()).unwrap();

    // e3 is not part of the project
    let stream = DataDriverStream::new("S", TENANT, "P", StreamDirection::Source, ServiceDomainBinding::explicit(["e1", "e3"]))
        .with_name("ingest");
    let created = data_driver_stream_create(&admin(), &mut conn, stream, &sink()).unwrap();
    assert_eq!(created.binding.service_domain_ids, ids(&["e1"]));

    // WHEN updated with another direction and a new binding
    let update = DataDriverStream::new("S", TENANT, "P", StreamDirection::Sink, ServiceDomainBinding::explicit(["e2"]));
    let updated = data_driver_stream_update(&admin(), &mut conn, update, &sink()).unwrap();

    // THEN the binding changes and the direction does not
    assert_eq!(updated.direction, StreamDirection::Source);
    let stored = data_driver_stream_get(&admin(), &conn, "S").unwrap();
    assert_eq!(stored.direction, StreamDirection::Source);
    assert_eq!(stored.binding, updated.binding);
    assert_eq!(stored.binding.service_domain_ids, ids(&["e2"]));

    // AND delete clears the binding rows
    data_driver_stream_delete(&admin(), &mut conn, "S", &sink()).unwrap();
    let err = data_driver_stream_get(&admin(), &conn, "S").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(SqliteBindingStore::new(TENANT).get(&conn, "S").unwrap(), ServiceDomainBinding::default());
}

#[test]
fn test_stream_project_cannot_change() {
    let mut conn = setup();
    add_edge(&mut conn, "e1", &[]);
    for id in ["P", "Q"] {
        project_create(&admin(), &mut conn, Project::explicit(id, TENANT, ["e1"]), &sink()).unwrap();
    }
    let stream = DataDriverStream::new("S", TENANT, "P", StreamDirection::Sink, ServiceDomainBinding::explicit(["e1"]));
    data_driver_stream_create(&admin(), &mut conn, stream, &sink()).unwrap();

    let moved = DataDriverStream::new("S", TENANT, "Q", StreamDirection::Sink, ServiceDomainBinding::explicit(["e1"]));
    let err = data_driver_stream_update(&admin(), &mut conn, moved, &sink()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(data_driver_stream_get(&admin(), &conn, "S").unwrap().project_id, "P");
}

#[test]
fn test_project_update_fans_out_to_streams() {
    // GIVEN a Category project {cat=v1} with a config and a stream selecting cat=v1
    let mut conn = setup();
    add_edge(&mut conn, "e1", &[("cat", "v1"), ("region", "us")]);
    add_edge(&mut conn, "e2", &[("cat", "v1"), ("region", "eu")]);
    project_create(&admin(), &mut conn, Project::category("P", TENANT, selector(&[("cat", "v1")])), &sink()).unwrap();
    let binding = ServiceDomainBinding::selector(selector(&[("cat", "v1")])).with_excludes(["e1", "e2"]);
    data_driver_config_create(&admin(), &mut conn, DataDriverConfig::new("C", TENANT, "P", binding.clone()), &sink()).unwrap();
    let stream = DataDriverStream::new("S", TENANT, "P", StreamDirection::Sink, binding);
    data_driver_stream_create(&admin(), &mut conn, stream, &sink()).unwrap();

    // WHEN the project narrows to region=eu
    let (queue, mut rx) = ChangeQueue::bounded(16);
    let narrowed = Project::category("P", TENANT, selector(&[("cat", "v1"), ("region", "eu")]));
    let update = project_update(&admin(), &mut conn, narrowed, &queue).unwrap();

    // THEN the stream's selector is narrowed too, dropping the exclude that no longer matches
    assert_eq!(update.streams.len(), 1);
    let stored = data_driver_stream_get(&admin(), &conn, "S").unwrap();
    assert_eq!(stored.binding, update.streams[0].binding);
    assert_eq!(stored.binding.service_domain_selectors, selector(&[("cat", "v1"), ("region", "eu")]));
    assert_eq!(stored.binding.exclude_service_domain_ids, ids(&["e2"]));

    let owners: Vec<(BindingOwner, String)> = rx
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            EntityEvent::ServiceDomainBinding { owner, owner_id, .. } => Some((owner, owner_id)),
            _ => None,
        })
        .collect();
    assert_eq!(
        owners,
        vec![
            (BindingOwner::DataDriverConfig, "C".to_string()),
            (BindingOwner::DataDriverStream, "S".to_string()),
        ]
    );
}
