//! Application configuration loaded from a YAML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Position;

/// Backend address used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";
/// Public IP geolocation endpoint used by the `ip` location provider.
pub const DEFAULT_IP_LOCATION_ENDPOINT: &str = "http://ip-api.com/json";

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading the configuration.
pub enum ConfigError {
    /// The file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        /// Offending file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid YAML for [`Config`].
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
/// Where the device position comes from.
pub enum LocationConfig {
    /// Location access refused.
    #[default]
    Disabled,
    /// Fixed coordinates.
    Fixed {
        /// Latitude in decimal degrees.
        latitude: f64,
        /// Longitude in decimal degrees.
        longitude: f64,
    },
    /// Look the position up from the public IP address.
    Ip {
        /// Geolocation endpoint.
        #[serde(default = "default_ip_endpoint")]
        endpoint: String,
    },
}

impl From<Position> for LocationConfig {
    fn from(position: Position) -> Self {
        Self::Fixed {
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Top-level configuration.
pub struct Config {
    /// Base URL of the collection point backend.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Location source.
    pub location: LocationConfig,
    /// Log file; defaults to the user cache directory.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            request_timeout_secs: 10,
            user_agent: "ecoleta/0.1".to_owned(),
            location: LocationConfig::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ecoleta").join("config.yaml"))
    }

    /// Default location of the log file.
    #[must_use]
    pub fn default_log_file() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ecoleta")
            .join("ecoleta.log")
    }

    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Self::from_yaml(&text)
    }

    /// Read an explicit file, or the default file when present, or fall back
    /// to defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when an explicit file is missing, or when any
    /// file that exists cannot be parsed.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured log file, or the default one.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(Self::default_log_file)
    }
}

fn default_ip_endpoint() -> String {
    DEFAULT_IP_LOCATION_ENDPOINT.to_owned()
}
