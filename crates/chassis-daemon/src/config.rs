//! Daemon configuration.
//!
//! Configuration is loaded from `~/.config/chassisd/config.toml` (or the
//! path in `CHASSISD_CONFIG`).
//!
//! ## Example Configuration
//!
//! ```toml
//! [settings]
//! refresh_interval_secs = 600
//! request_timeout_secs = 30
//!
//! [[enclosures]]
//! id = "rack1-top"
//! name = "Rack 1 upper chassis"
//! address = "10.0.0.1"
//! username = "admin"
//! password = "hunter2"
//!
//! [[enclosures]]
//! id = "rack1-bottom"
//! name = "Rack 1 lower chassis"
//! address = "10.0.0.2"
//! username = "admin"
//! password = "hunter2"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chassis_common::EnclosureDescriptor;
use serde::Deserialize;

use crate::error::{DaemonError, Result};

/// Daemon configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Optional daemon settings
    #[serde(default)]
    pub settings: Settings,

    /// The enclosure fleet (fixed for the lifetime of the process)
    pub enclosures: Vec<EnclosureDescriptor>,
}

/// Optional daemon settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Seconds between refresh cycles (default: 600 = 10 minutes)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Outbound request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

const fn default_refresh_interval() -> u64 {
    600 // 10 minutes
}

const fn default_request_timeout() -> u64 {
    30
}

impl Settings {
    /// Refresh cycle period as a [`Duration`].
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Outbound request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl DaemonConfig {
    /// Loads configuration from the default location.
    ///
    /// Reads from `~/.config/chassisd/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config directory cannot be determined
    /// - The file doesn't exist
    /// - Deserialization or validation fails
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Err(DaemonError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        Self::load_from(&path)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Returns the default configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DaemonError::Config("Failed to determine config directory".to_string()))?
            .join("chassisd");

        Ok(config_dir.join("config.toml"))
    }

    /// Validates the configuration.
    ///
    /// Startup is fatal on a malformed fleet: running with a partial or
    /// ambiguous set of enclosures is worse than not running.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The refresh interval or request timeout is zero
    /// - No enclosures are defined
    /// - Any enclosure is missing an id, name, address, or username
    /// - Duplicate enclosure ids are found
    pub fn validate(&self) -> Result<()> {
        if self.settings.refresh_interval_secs == 0 {
            return Err(DaemonError::Config(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.settings.request_timeout_secs == 0 {
            return Err(DaemonError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.enclosures.is_empty() {
            return Err(DaemonError::Config(
                "No enclosures defined in configuration".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for enclosure in &self.enclosures {
            if enclosure.id.trim().is_empty() {
                return Err(DaemonError::Config(format!(
                    "Enclosure '{}' has an empty id",
                    enclosure.name
                )));
            }
            if enclosure.name.trim().is_empty() {
                return Err(DaemonError::Config(format!(
                    "Enclosure '{}' has an empty name",
                    enclosure.id
                )));
            }
            if enclosure.address.trim().is_empty() {
                return Err(DaemonError::Config(format!(
                    "Enclosure '{}' has an empty address",
                    enclosure.id
                )));
            }
            if enclosure.username.trim().is_empty() {
                return Err(DaemonError::Config(format!(
                    "Enclosure '{}' has an empty username",
                    enclosure.id
                )));
            }
            if !seen.insert(&enclosure.id) {
                return Err(DaemonError::Config(format!(
                    "Duplicate enclosure id '{}'",
                    enclosure.id
                )));
            }
        }

        Ok(())
    }
}
