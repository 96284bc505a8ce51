//! Server settings.
//!
//! Layered with the `config` crate, later sources winning:
//!
//! 1. defaults
//! 2. `orderflow.toml` (or the file named by `ORDERFLOW_CONFIG`), if present
//! 3. `ORDERFLOW_*` environment variables, `__` between sections
//!    (`ORDERFLOW_CACHE__CAPACITY=5000`)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use orderflow_ingest::{PipelineConfig, RetryConfig};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "orderflow.toml";
pub const CONFIG_PATH_ENV: &str = "ORDERFLOW_CONFIG";
pub const ENV_PREFIX: &str = "ORDERFLOW";

/// Errores al cargar la configuracion.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub ingest: IngestSettings,
    /// Tiempo maximo para detener el pipeline al apagar.
    pub shutdown_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            cache: CacheSettings::default(),
            ingest: IngestSettings::default(),
            shutdown_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Backend del cache de orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Lru,
    Moka,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub capacity: usize,
    /// Orders cargadas en el cache al arrancar.
    pub warmup_limit: usize,
    /// Expiracion por inactividad, solo para el backend moka.
    pub time_to_idle_secs: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Lru,
            capacity: 1000,
            warmup_limit: 100,
            time_to_idle_secs: None,
        }
    }
}

impl CacheSettings {
    pub fn time_to_idle(&self) -> Option<Duration> {
        self.time_to_idle_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub max_retries: u32,
    pub retry_capacity: usize,
    pub fixed_backoff_ms: u64,
    pub poll_interval_ms: u64,
    pub error_backoff_ms: u64,
    /// 0 deja los dead letters solo en el log.
    pub dead_letter_capacity: usize,
    pub channel_capacity: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_capacity: 1024,
            fixed_backoff_ms: 5000,
            poll_interval_ms: 500,
            error_backoff_ms: 1000,
            dead_letter_capacity: 1000,
            channel_capacity: 1024,
        }
    }
}

impl IngestSettings {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            retry_capacity: self.retry_capacity,
            fixed_backoff: Duration::from_millis(self.fixed_backoff_ms),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            error_backoff: Duration::from_millis(self.error_backoff_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Settings {
    /// Loads settings from the config file and the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::from_sources(Some(&path), None)
    }

    /// Loads settings from an optional file and an environment.
    ///
    /// `env` replaces the process environment when given, which keeps tests
    /// independent of each other.
    pub fn from_sources(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env);

        let settings: Settings = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the server cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cache.capacity == 0 {
            return Err(SettingsError::invalid("cache.capacity", "must be at least 1"));
        }
        if self.cache.time_to_idle_secs == Some(0) {
            return Err(SettingsError::invalid(
                "cache.time_to_idle_secs",
                "must be greater than 0",
            ));
        }
        if self.ingest.retry_capacity == 0 {
            return Err(SettingsError::invalid(
                "ingest.retry_capacity",
                "must be at least 1",
            ));
        }
        if self.ingest.channel_capacity == 0 {
            return Err(SettingsError::invalid(
                "ingest.channel_capacity",
                "must be at least 1",
            ));
        }
        if self.ingest.poll_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "ingest.poll_interval_ms",
                "must be greater than 0",
            ));
        }
        self.server.socket_addr()?;
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SettingsError::invalid("server.host", format!("{e}")))
    }
}
