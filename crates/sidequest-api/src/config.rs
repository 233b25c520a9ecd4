use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use sidequest_bus::BusConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bus: BusSettings,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    File,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageKind,
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::default(),
            path: default_storage_path(),
            database: default_database(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/sidequest.json")
}

fn default_database() -> String {
    "sidequest".to_string()
}

/// Message bus tuning, in config-file units
#[derive(Debug, Clone, Deserialize)]
pub struct BusSettings {
    pub request_timeout_ms: u64,
    pub channel_capacity: usize,
    pub broadcast_capacity: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        let defaults = BusConfig::default();
        Self {
            request_timeout_ms: defaults.request_timeout.as_millis() as u64,
            channel_capacity: defaults.channel_capacity,
            broadcast_capacity: defaults.broadcast_capacity,
        }
    }
}

impl From<&BusSettings> for BusConfig {
    fn from(settings: &BusSettings) -> Self {
        BusConfig::new()
            .with_request_timeout(Duration::from_millis(settings.request_timeout_ms))
            .with_channel_capacity(settings.channel_capacity)
            .with_broadcast_capacity(settings.broadcast_capacity)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `SIDEQUEST_<SECTION>__<KEY>` environment variables,
    ///    e.g. `SIDEQUEST_SERVER__PORT=8080`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("SIDEQUEST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        if cfg.storage.backend == StorageKind::Mongodb {
            cfg.mongodb_uri = std::env::var("MONGODB_URI").map_err(|_| {
                ConfigError::Message("MONGODB_URI environment variable is required for mongodb storage".to_string())
            })?;
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn bus_config(&self) -> BusConfig {
        BusConfig::from(&self.bus)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}
