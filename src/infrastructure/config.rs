//! Configuration infrastructure
//!
//! Contains configuration loading and management for ufcstats.com harvesting.
//!
//! The configuration file is JSON. Every section has defaults, so a partial
//! file only overrides the keys it names.

#![allow(clippy::derivable_impls)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::retry_manager::RetryPolicy;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source site and HTTP client settings
    pub source: SourceConfig,

    /// Retry budgets and backoff intervals
    pub retry: RetryConfig,

    /// Scrape loop pacing
    pub scrape: ScrapeConfig,

    /// Where URL lists, scraped datasets and final tables live
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Source site and HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Site root, without trailing slash
    pub base_url: String,

    /// User agent string
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Whether to follow redirects
    pub follow_redirects: bool,
}

/// Retry budgets per failure kind (재시도 예산)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries allowed after a transport-level failure
    pub connection_lost_retries: u32,

    /// Sleep before retrying a lost connection, in seconds
    pub connection_lost_delay_seconds: u64,

    /// Retries allowed after an HTTP 429 response
    pub rate_limited_retries: u32,

    /// Sleep before retrying a rate-limited request, in seconds
    pub rate_limited_delay_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Pause after every successful fetch, in milliseconds
    pub request_delay_ms: u64,

    /// Run the four entity loops concurrently (fetches inside one entity stay serial)
    pub concurrent_entities: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of every file the harvester reads or writes
    pub data_dir: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Log directory; relative paths resolve against the data directory
    pub log_dir: PathBuf,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            connection_lost_retries: defaults::CONNECTION_LOST_RETRIES,
            connection_lost_delay_seconds: defaults::CONNECTION_LOST_DELAY_SECONDS,
            rate_limited_retries: defaults::RATE_LIMITED_RETRIES,
            rate_limited_delay_seconds: defaults::RATE_LIMITED_DELAY_SECONDS,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            connection_lost_budget: self.connection_lost_retries,
            connection_lost_delay: Duration::from_secs(self.connection_lost_delay_seconds),
            rate_limited_budget: self.rate_limited_retries,
            rate_limited_delay: Duration::from_secs(self.rate_limited_delay_seconds),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: defaults::REQUEST_DELAY_MS,
            concurrent_entities: false,
        }
    }
}

impl ScrapeConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(defaults::DATA_DIR),
        }
    }
}

impl StorageConfig {
    pub fn urls_dir(&self) -> PathBuf {
        self.data_dir.join("urls")
    }

    pub fn scraped_dir(&self) -> PathBuf {
        self.data_dir.join("scraped_files")
    }

    pub fn normalized_dir(&self) -> PathBuf {
        self.data_dir.join("normalized")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_filters = HashMap::new();
        module_filters.insert("reqwest".to_string(), "warn".to_string());
        module_filters.insert("hyper".to_string(), "warn".to_string());
        module_filters.insert("html5ever".to_string(), "error".to_string());
        module_filters.insert("selectors".to_string(), "error".to_string());

        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: true,
            file_name: "harvester.log".to_string(),
            log_dir: PathBuf::from("logs"),
            module_filters,
        }
    }
}

impl LoggingConfig {
    pub fn resolved_log_dir(&self, data_dir: &Path) -> PathBuf {
        if self.log_dir.is_absolute() {
            self.log_dir.clone()
        } else {
            data_dir.join(&self.log_dir)
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the directory holding the configuration file
    pub fn get_config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Failed to resolve the user config directory")?;
        Ok(base.join("ufcstats-harvester"))
    }

    /// Create a manager for the default configuration file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join("config.json");
        Ok(Self { config_path })
    }

    /// Create a manager for an explicit configuration file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration, creating the default file on first run
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration parse error: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// Default values for configuration
pub mod defaults {
    /// ufcstats.com root
    pub const BASE_URL: &str = "http://ufcstats.com";

    /// Browser-like user agent; the fighter listing rejects bare clients
    pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const CONNECTION_LOST_RETRIES: u32 = 3;
    pub const CONNECTION_LOST_DELAY_SECONDS: u64 = 60;
    pub const RATE_LIMITED_RETRIES: u32 = 1;
    pub const RATE_LIMITED_DELAY_SECONDS: u64 = 30;

    /// Pause after each successful fetch
    pub const REQUEST_DELAY_MS: u64 = 1000;

    pub const DATA_DIR: &str = "dist";

    pub const LOG_LEVEL: &str = "info";
}
