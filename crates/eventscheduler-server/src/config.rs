//! Scheduler configuration loaded from TOML.
//!
//! ```toml
//! debug = false
//!
//! [store]
//! path = "/home/me/.local/share/eventscheduler/events.json"
//!
//! [conflicts]
//! cross_midnight = false
//!
//! [listing]
//! default_limit = 10
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use eventscheduler_core::ConflictPolicy;

use crate::error::{ServerError, ServerResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Enable debug logging.
    pub debug: bool,

    /// Where events are persisted.
    pub store: StoreSettings,

    /// Conflict detection options.
    pub conflicts: ConflictPolicy,

    /// Listing defaults.
    pub listing: ListingSettings,
}

/// Persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Snapshot file; defaults to `<data_dir>/eventscheduler/events.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Listing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSettings {
    /// Page size used when a list request gives none.
    pub default_limit: usize,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

impl SchedulerConfig {
    /// Loads configuration from the default path, or defaults if no file exists.
    pub fn load() -> ServerResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ServerError::config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ServerError::config(format!("failed to render config: {}", e)))
    }

    /// Returns the snapshot path, falling back to the data directory.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("events.json"))
    }

    /// Builder: set the snapshot path.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.path = Some(path.into());
        self
    }

    /// Builder: set debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventscheduler")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventscheduler")
    }

    fn validate(&self) -> ServerResult<()> {
        if self.listing.default_limit == 0 {
            return Err(ServerError::config(
                "listing.default_limit must be at least 1",
            ));
        }
        Ok(())
    }
}
