use fleetscope_core::{Category, Edge, Labels};
use fleetscope_store::db::open_in_memory_migrated;
use fleetscope_store::LabelRepo;
use rusqlite::Connection;

pub const TENANT: &str = "tenant-1";

/// Migrated in-memory database with category `cat` = {v1, v2} and
/// category `region` = {us, eu}
#[allow(dead_code)]
pub fn setup_db() -> Connection {
    let conn = open_in_memory_migrated().expect("in-memory db");
    for (id, values) in [("cat", vec!["v1", "v2"]), ("region", vec!["us", "eu"])] {
        let category = Category::new(
            id,
            TENANT,
            id,
            values.into_iter().map(String::from).collect(),
        );
        LabelRepo::upsert_category(&conn, &category).expect("category");
    }
    conn
}

#[allow(dead_code)]
pub fn add_edge(conn: &Connection, id: &str, labels: &[(&'static str, &'static str)]) {
    let edge = Edge::new(id, TENANT, id).with_labels(labels.iter().copied().collect::<Labels>());
    LabelRepo::upsert_edge(conn, &edge).expect("edge");
}
