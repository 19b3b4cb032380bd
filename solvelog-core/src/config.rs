//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/solvelog/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/solvelog/` (~/.config/solvelog/)
//! - Data: `$XDG_DATA_HOME/solvelog/` (~/.local/share/solvelog/)
//! - State/Logs: `$XDG_STATE_HOME/solvelog/` (~/.local/state/solvelog/)

use crate::analytics::Calendar;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Analytics configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Input file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analytics defaults
#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing window in days when none is given; unset means all time
    #[serde(default)]
    pub default_window_days: Option<u32>,

    /// Zone for calendar-day truncation: "local", "utc" or "+HH:MM"
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_window_days: None,
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "local".to_string()
}

/// Input file locations
#[derive(Debug, Deserialize, Default)]
pub struct DataConfig {
    /// Submission event file (JSON array); defaults to [`Config::default_events_path`]
    pub events_path: Option<PathBuf>,
    /// Optional slug → metadata catalog (JSON object)
    pub catalog_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse as TOML but make no sense
    pub fn validate(&self) -> Result<()> {
        if Calendar::parse(&self.analytics.timezone).is_none() {
            return Err(Error::Config(format!(
                "analytics.timezone must be \"local\", \"utc\" or \"+HH:MM\", got {:?}",
                self.analytics.timezone
            )));
        }
        if self.analytics.default_window_days == Some(0) {
            return Err(Error::Config(
                "analytics.default_window_days must be at least 1".to_string(),
            ));
        }
        if self.logging.max_files == 0 {
            return Err(Error::Config(
                "logging.max_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Calendar used to truncate instants to dates
    pub fn calendar(&self) -> Result<Calendar> {
        Calendar::parse(&self.analytics.timezone).ok_or_else(|| {
            Error::Config(format!("invalid timezone {:?}", self.analytics.timezone))
        })
    }

    /// Event file to read: the configured path or the default location
    pub fn events_path(&self) -> PathBuf {
        self.data
            .events_path
            .clone()
            .unwrap_or_else(Self::default_events_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/solvelog/config.toml` (~/.config/solvelog/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("solvelog").join("config.toml")
    }

    /// Returns the data directory path (for exported submission files)
    ///
    /// `$XDG_DATA_HOME/solvelog/` (~/.local/share/solvelog/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("solvelog")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/solvelog/` (~/.local/state/solvelog/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("solvelog")
    }

    /// Returns the default submission event file path
    ///
    /// `$XDG_DATA_HOME/solvelog/submissions.json`
    pub fn default_events_path() -> PathBuf {
        Self::data_dir().join("submissions.json")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/solvelog/solvelog.log` (~/.local/state/solvelog/solvelog.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("solvelog.log")
    }
}
