use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "price-monitor.toml";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub fetcher: FetcherConfig,
    pub scheduler: SchedulerConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: PathBuf,
    pub history_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub user_agent: String,
    /// Seconds
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minutes between watch passes
    pub default_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub display_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("price_monitor_data.json"),
            history_file: PathBuf::from("price_history.csv"),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: 15,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { default_interval: 60 }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { display_limit: 20 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl AppConfig {
    /// Loads an explicit config file, or `price-monitor.toml` when one exists
    /// in the working directory. Missing keys keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let source = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let s = Config::builder().add_source(source).build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message("Fetcher request_timeout must be greater than 0".into()));
        }

        if self.fetcher.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Fetcher user_agent must not be empty".into()));
        }

        if self.scheduler.default_interval == 0 {
            return Err(ConfigError::Message("Scheduler default_interval must be at least 1 minute".into()));
        }

        if self.scheduler.default_interval.checked_mul(60).is_none() {
            return Err(ConfigError::Message("Scheduler default_interval is too large".into()));
        }

        if self.history.display_limit == 0 {
            return Err(ConfigError::Message("History display_limit must be greater than 0".into()));
        }

        if self.storage.data_file.as_os_str().is_empty() || self.storage.history_file.as_os_str().is_empty() {
            return Err(ConfigError::Message("Storage paths must not be empty".into()));
        }

        Ok(())
    }
}
