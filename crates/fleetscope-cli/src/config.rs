//! `fleetscope.toml` loading

use std::path::{Path, PathBuf};

use fleetscope_core::logging_facility::Profile;
use fleetscope_core::{ExError, ExErrorKind, ExResult};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "fleetscope.toml";
pub const DB_ENV_VAR: &str = "FLEETSCOPE_DB";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".fleetscope/store.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub profile: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: "development".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyConfig {
    /// Capacity of the change-notification queue
    pub capacity: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            capacity: fleetscope_engine::notify::DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `fleetscope.toml` in the
    /// working directory is read if present and defaults apply otherwise.
    /// `FLEETSCOPE_DB` overrides the store path in both cases.
    pub fn load(path: Option<&Path>) -> ExResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_db_override(std::env::var(DB_ENV_VAR).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> ExResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> ExResult<Self> {
        toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_config")
                .with_message(e.to_string())
        })
    }

    pub fn apply_db_override(&mut self, db: Option<String>) {
        if let Some(db) = db.filter(|d| !d.trim().is_empty()) {
            self.store.path = PathBuf::from(db);
        }
    }

    /// The logging profile; only `development` and `production` are accepted
    pub fn profile(&self) -> ExResult<Profile> {
        match self.logging.profile.parse::<Profile>()? {
            Profile::Test => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_config")
                .with_message("logging profile 'test' is reserved for test harnesses")),
            profile => Ok(profile),
        }
    }
}
