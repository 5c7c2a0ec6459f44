//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!

/// Migration metadata
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// Get all embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_label_store",
            sql: include_str!("../../migrations/001_label_store.sql"),
        },
        Migration {
            id: "002_projects_and_entities",
            sql: include_str!("../../migrations/002_projects_and_entities.sql"),
        },
        Migration {
            id: "003_data_driver_bindings",
            sql: include_str!("../../migrations/003_data_driver_bindings.sql"),
        },
        Migration {
            id: "004_binding_modes",
            sql: include_str!("../../migrations/004_binding_modes.sql"),
        },
        Migration {
            id: "005_data_driver_streams",
            sql: include_str!("../../migrations/005_data_driver_streams.sql"),
        },
    ]
}
