#![allow(clippy::unwrap_used, clippy::expect_used)]

use fleetscope_core::core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use fleetscope_core::errors::ScopeError;
use fleetscope_core::logging_facility::test_capture::init_test_capture;
use fleetscope_core::{log_op_end, log_op_error, log_op_start};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, project_id = "p1");

    let events = capture.events_for(op_name);
    let start = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_START))
        .expect("start event");
    assert_eq!(start.field("project_id"), Some("p1"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for(op_name);
    let end_events: Vec<_> = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ScopeError::PermissionDenied {
        project_id: "p1".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for(op_name);
    let error_event = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("error event");
    assert_eq!(error_event.field("err_code"), Some("ERR_PERMISSION_DENIED"));
}

#[test]
fn test_stale_exclude_cleanup_is_debug_only() {
    use fleetscope_core::{cleanup_binding, EdgeLabelSnapshot, Project, ServiceDomainBinding};

    let capture = init_test_capture();
    let project = Project::category("p-log", "t", [("cat", "v1")].into_iter().collect());
    let mut binding = ServiceDomainBinding::selector([("cat", "v1")].into_iter().collect())
        .with_excludes(["gone"]);

    cleanup_binding(&project, &mut binding, &EdgeLabelSnapshot::new());

    let dropped: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.field("project_id") == Some("p-log"))
        .collect();
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].level, tracing::Level::DEBUG);
}
