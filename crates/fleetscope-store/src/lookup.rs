//! SQLite-backed project lookup for the scope resolvers

use fleetscope_core::{ExResult, Project, ProjectLookup};
use rusqlite::Connection;

use crate::repo::ProjectRepo;

pub struct SqliteProjectLookup<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteProjectLookup<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ProjectLookup for SqliteProjectLookup<'_> {
    fn find_project(&self, tenant_id: &str, project_id: &str) -> ExResult<Option<Project>> {
        ProjectRepo::find_project(self.conn, tenant_id, project_id)
    }
}
