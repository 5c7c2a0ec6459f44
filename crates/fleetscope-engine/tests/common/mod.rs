use fleetscope_core::core_types::TenantScope;
use fleetscope_core::{Category, Edge, Labels, NoopChangeSink, Selector};
use fleetscope_engine::commands::labels::{category_upsert, edge_upsert};
use fleetscope_store::db::open_in_memory_migrated;
use rusqlite::Connection;

pub const TENANT: &str = "tenant-1";

#[allow(dead_code)]
pub fn admin() -> TenantScope {
    TenantScope::infra_admin(TENANT)
}

/// Migrated database with category `cat` = {v1, v2}, `region` = {us, eu}
/// and no edges
#[allow(dead_code)]
pub fn setup() -> Connection {
    let conn = open_in_memory_migrated().expect("in-memory db");
    for (id, values) in [("cat", ["v1", "v2"]), ("region", ["us", "eu"])] {
        let category = Category::new(id, TENANT, id, values.iter().map(|v| v.to_string()).collect());
        category_upsert(&admin(), &conn, category).expect("category");
    }
    conn
}

#[allow(dead_code)]
pub fn add_edge(conn: &mut Connection, id: &str, labels: &[(&'static str, &'static str)]) {
    let edge = Edge::new(id, TENANT, id).with_labels(labels.iter().copied().collect::<Labels>());
    edge_upsert(&admin(), conn, edge).expect("edge");
}

#[allow(dead_code)]
pub fn selector(terms: &[(&'static str, &'static str)]) -> Selector {
    terms.iter().copied().collect()
}

#[allow(dead_code)]
pub fn sink() -> NoopChangeSink {
    NoopChangeSink
}
