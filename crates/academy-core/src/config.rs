//! Store configuration.
//!
//! Persistence is chosen when the store is built, from a small JSON file in
//! the user's config directory. A missing file means the defaults: mock-only
//! mode, where nothing is cached and the seed data is always what you get.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::persistence::{
    DEFAULT_STORAGE_KEY, FileStorage, KeyValueAdapter, NullAdapter, PersistenceAdapter,
};
use crate::{Error, Result};

/// Where snapshots are mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    /// No caching; demo data stays deterministic.
    #[default]
    MockOnly,
    /// Mirror to a JSON file under the data directory.
    Local,
}

/// Store settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Persistence mode.
    pub persistence: PersistenceMode,
    /// Key the collection is stored under.
    pub storage_key: String,
    /// Directory for local storage; the platform data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persistence: PersistenceMode::MockOnly,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: None,
        }
    }
}

/// Validation error for store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Storage key is empty.
    EmptyStorageKey,
    /// Data directory is set but empty.
    EmptyDataDir,
}

impl ConfigError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyStorageKey => "Storage key is required",
            Self::EmptyDataDir => "Data directory must not be empty",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyStorageKey => "storage_key",
            Self::EmptyDataDir => "data_dir",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ConfigError {}

impl StoreConfig {
    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("academy")
            .join("config.json")
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!("Store configuration saved to {:?}", path);
        Ok(())
    }

    /// Check the configuration, collecting every problem.
    ///
    /// # Errors
    ///
    /// Returns every `ConfigError` found.
    pub fn validate(&self) -> std::result::Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.storage_key.trim().is_empty() {
            errors.push(ConfigError::EmptyStorageKey);
        }
        if self
            .data_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            errors.push(ConfigError::EmptyDataDir);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Directory local storage writes to.
    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("academy")
        })
    }

    /// Build the persistence adapter this configuration selects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if validation fails.
    pub fn build_adapter(&self) -> Result<Box<dyn PersistenceAdapter>> {
        self.validate().map_err(|errors| {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.field(), e.message()))
                .collect();
            Error::Config(messages.join(", "))
        })?;

        Ok(match self.persistence {
            PersistenceMode::MockOnly => Box::new(NullAdapter),
            PersistenceMode::Local => Box::new(KeyValueAdapter::with_key(
                FileStorage::new(self.resolved_data_dir()),
                self.storage_key.clone(),
            )),
        })
    }
}
