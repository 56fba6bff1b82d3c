//! Layered configuration using Figment
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. A config file: the explicit path if given, otherwise the first of
//!    `opsboard.toml`, `opsboard.yaml`, `opsboard.yml`, `opsboard.json` found in
//!    the search directory
//! 3. Environment variables prefixed `OPSBOARD_`, nested keys split on `__`
//!    (`OPSBOARD_NOTIFY__WEBHOOK_URL`)

use crate::error::ConfigError;
use crate::retry::RetryConfig;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use opsboard_reorder::KeySpacing;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

/// Config file names probed in the search directory, highest priority first
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    "opsboard.toml",
    "opsboard.yaml",
    "opsboard.yml",
    "opsboard.json",
];

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "OPSBOARD_";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsboardConfig {
    /// Key layout used when a column is renumbered
    pub spacing: KeySpacing,
    /// How often a gesture is replanned when its columns change underneath it
    pub lock_retry_attempts: u32,
    pub notify: NotifyConfig,
}

impl Default for OpsboardConfig {
    fn default() -> Self {
        Self {
            spacing: KeySpacing::default(),
            lock_retry_attempts: 3,
            notify: NotifyConfig::default(),
        }
    }
}

impl OpsboardConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spacing
            .validate()
            .map_err(|e| ConfigError::invalid_value("spacing.unit", e.to_string()))?;

        if self.lock_retry_attempts == 0 {
            return Err(ConfigError::invalid_value(
                "lock_retry_attempts",
                "must be at least 1",
            ));
        }

        self.notify.validate()
    }
}

/// Notification delivery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Webhook receiving move events; moves are only logged when unset
    pub webhook_url: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_ms: 5_000,
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl NotifyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "notify.timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::invalid_value(
                "notify.backoff_multiplier",
                format!("must be at least 1.0, got {}", self.backoff_multiplier),
            ));
        }
        if let Some(url) = &self.webhook_url {
            url::Url::parse(url)
                .map_err(|e| ConfigError::invalid_value("notify.webhook_url", e.to_string()))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry policy for webhook delivery
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

/// Loads [`OpsboardConfig`] from defaults, file and environment
///
/// No caching is performed; every call to [`ConfigLoader::load`] reads the
/// sources again.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    search_dir: PathBuf,
}

impl ConfigLoader {
    /// Loader searching the current working directory
    pub fn new() -> Self {
        Self {
            file: None,
            search_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Use this file instead of searching
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Search for config files in `dir`
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = dir.into();
        self
    }

    /// Merge all sources, extract and validate
    pub fn load(&self) -> Result<OpsboardConfig, ConfigError> {
        let config: OpsboardConfig = self.build_figment()?.extract()?;
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn build_figment(&self) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(OpsboardConfig::default()));

        if let Some(path) = self.config_file()? {
            trace!("Loading config file: {}", path.display());
            figment = figment.merge(file_provider(&path));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn config_file(&self) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(path) = &self.file {
            if !path.is_file() {
                return Err(ConfigError::MissingFile { path: path.clone() });
            }
            return Ok(Some(path.clone()));
        }

        Ok(CONFIG_FILE_NAMES
            .iter()
            .map(|name| self.search_dir.join(name))
            .find(|candidate| candidate.is_file()))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn file_provider(path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
        Some("json") => Figment::from(Json::file(path)),
        _ => Figment::from(Toml::file(path)),
    }
}
