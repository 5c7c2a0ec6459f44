pub mod binding;
pub mod migrate;
pub mod scope;

use fleetscope_core::core_types::TenantScope;
use fleetscope_store::db::open_and_migrate;
use rusqlite::Connection;

use crate::config::Config;

/// Settings shared by every subcommand
pub struct Context {
    pub config: Config,
    pub tenant: String,
}

impl Context {
    pub fn new(config: Config, tenant: String) -> Self {
        Self { config, tenant }
    }

    /// The CLI always acts as an infra admin of the chosen tenant
    pub fn scope(&self) -> TenantScope {
        TenantScope::infra_admin(self.tenant.as_str())
    }

    /// Open the configured store, applying any pending migrations
    pub fn connect(&self) -> Result<Connection, Box<dyn std::error::Error>> {
        Ok(open_and_migrate(&self.config.store.path)?)
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
