//! Runtime configuration loaded from `config.toml` in the XDG config directory.

use crate::config;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Which key-value backend holds the preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Json,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// When false, device geolocation is treated as unsupported
    pub geolocation: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            geolocation: true,
            latitude: None,
            longitude: None,
        }
    }
}

impl LocationConfig {
    /// Fixed coordinates, only when both halves are present
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub forecast_url: String,
    pub geocoding_url: String,
    pub reverse_geocoding_url: String,
    pub favicon_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            forecast_url: config::FORECAST_URL.to_string(),
            geocoding_url: config::GEOCODING_URL.to_string(),
            reverse_geocoding_url: config::REVERSE_GEOCODING_URL.to_string(),
            favicon_url: config::FAVICON_URL.to_string(),
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub storage: StorageConfig,
    pub network: NetworkConfig,
    pub location: LocationConfig,
    pub services: ServicesConfig,
}

impl UserConfig {
    /// Parse configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load configuration from the XDG config directory, falling back to
    /// defaults when the file is unreadable or invalid.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Configuration loaded from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to load {:?}, using defaults: {}", path, e);
                Self::default()
            }
        }
    }
}

/// XDG data directory for the store
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "myyc", config::APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
}

fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "myyc", config::APP_NAME)
        .map(|dirs| dirs.config_dir().join(config::CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = UserConfig::parse("").unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.network.timeout_secs, config::DEFAULT_TIMEOUT_SECS);
        assert!(config.location.geolocation);
        assert_eq!(config.location.fixed_position(), None);
        assert_eq!(config.services.forecast_url, config::FORECAST_URL);
    }

    #[test]
    fn test_partial_config() {
        let config = UserConfig::parse(
            r#"
            [storage]
            backend = "json"

            [location]
            latitude = 52.52
            longitude = 13.40
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.location.fixed_position(), Some((52.52, 13.40)));
        assert!(config.location.geolocation);
        assert_eq!(config.network.timeout_secs, config::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_half_position_is_ignored() {
        let config = UserConfig::parse("[location]\nlatitude = 1.0\n").unwrap();
        assert_eq!(config.location.fixed_position(), None);
    }

    #[test]
    fn test_invalid_backend_is_an_error() {
        assert!(UserConfig::parse("[storage]\nbackend = \"redis\"\n").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = UserConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    }
}
