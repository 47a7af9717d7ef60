use crate::domain::DEFAULT_BUFFER_CAPACITY;
use hyperstream::{HttpDisconnectNotifier, ManagerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Status feed client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Server-push stream endpoint
    #[serde(default = "default_stream_url")]
    pub stream_url: String,
    /// Base URL of the API receiving disconnect notifications
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    /// Consecutive failures tolerated before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: usize,
    /// Pause between disconnect and connect on a manual reconnect
    #[serde(default = "default_manual_reconnect_delay_ms")]
    pub manual_reconnect_delay_ms: u64,
    /// Bound on the disconnect notice sent on a manual disconnect
    #[serde(default = "default_notify_timeout_ms")]
    pub notify_timeout_ms: u64,
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_stream_url() -> String {
    hyperstream::core::config::DEFAULT_STREAM_URL.to_string()
}

fn default_api_base_url() -> String {
    hyperstream::transport::notifier::DEFAULT_API_BASE_URL.to_string()
}

fn default_reconnect_interval_ms() -> u64 {
    3000
}

fn default_max_reconnect_attempts() -> usize {
    10
}

fn default_manual_reconnect_delay_ms() -> u64 {
    1000
}

fn default_notify_timeout_ms() -> u64 {
    5000
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_stats_interval_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            stream_url: default_stream_url(),
            api_base_url: default_api_base_url(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            manual_reconnect_delay_ms: default_manual_reconnect_delay_ms(),
            notify_timeout_ms: default_notify_timeout_ms(),
            buffer_capacity: default_buffer_capacity(),
            stats_interval_secs: default_stats_interval_secs(),
            log_level: default_log_level(),
        }
    }
}

impl FeedConfig {
    /// Load configuration from YAML file and .env
    ///
    /// A missing file yields the defaults; environment overrides and
    /// validation apply either way.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();

        let mut config = if config_path.exists() {
            let yaml_content = std::fs::read_to_string(config_path)?;
            Self::from_yaml(&yaml_content)?
        } else {
            info!("Config file {} not found, using defaults", config_path.display());
            Self::default()
        };

        // Don't fail if .env doesn't exist
        dotenv::dotenv().ok();
        config.apply_env_overrides(|key| std::env::var(key).ok());

        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without touching the environment
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserialises to unit, not a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Override fields from `SSE_STREAM_URL`, `SSE_API_URL` and `LOG_LEVEL`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SSE_STREAM_URL") {
            info!("Overriding stream URL from environment variable");
            self.stream_url = url;
        }
        if let Some(url) = lookup("SSE_API_URL") {
            info!("Overriding API URL from environment variable");
            self.api_base_url = url;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.stream_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "stream_url cannot be empty".to_string(),
            ));
        }
        if self.api_base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_base_url cannot be empty".to_string(),
            ));
        }
        if self.max_reconnect_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_reconnect_attempts must be greater than 0".to_string(),
            ));
        }
        if self.notify_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "notify_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "buffer_capacity must be greater than 0".to_string(),
            ));
        }
        if self.stats_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "stats_interval_secs must be greater than 0".to_string(),
            ));
        }
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn manual_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.manual_reconnect_delay_ms)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    /// Connection manager settings, with the HTTP disconnect notifier
    pub fn to_manager_config(&self) -> ManagerConfig {
        ManagerConfig::new(&self.stream_url)
            .with_fixed_delay(self.reconnect_interval(), self.max_reconnect_attempts)
            .with_notifier(
                HttpDisconnectNotifier::new(&self.api_base_url).with_timeout(self.notify_timeout()),
            )
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Stream URL: {}", self.stream_url);
        info!("  API URL: {}", self.api_base_url);
        info!(
            "  Reconnect: every {} ms, up to {} attempts",
            self.reconnect_interval_ms, self.max_reconnect_attempts
        );
        info!("  Manual reconnect delay: {} ms", self.manual_reconnect_delay_ms);
        info!("  Disconnect notice timeout: {} ms", self.notify_timeout_ms);
        info!("  Buffer capacity: {} events", self.buffer_capacity);
        info!("  Stats interval: {} seconds", self.stats_interval_secs);
        info!("  Log level: {}", self.log_level);
    }
}
