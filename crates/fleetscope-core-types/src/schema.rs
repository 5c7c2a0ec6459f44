//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across every layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TENANT_ID: &str = "tenant_id";

// Entity identifiers
pub const FIELD_PROJECT_ID: &str = "project_id";
pub const FIELD_ENTITY_ID: &str = "entity_id";
pub const FIELD_BINDING_ID: &str = "binding_id";

// Collection sizes
pub const FIELD_EDGE_COUNT: &str = "edge_count";
pub const FIELD_SELECTOR_COUNT: &str = "selector_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
