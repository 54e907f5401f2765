//! Configuration management for ShopTally
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, ShopTallyError};
use crate::storage::SqliteStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for ShopTally
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Spreadsheet report service settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; defaults to the user's data directory
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum bytes of stored keys and values
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,
}

fn default_quota_bytes() -> u64 {
    5 * 1024 * 1024 // 5 MB, the usual browser storage allowance
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            quota_bytes: default_quota_bytes(),
        }
    }
}

/// Spreadsheet report service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Deployed web app URL of the spreadsheet script
    #[serde(default)]
    pub web_app_url: Option<String>,

    /// API key expected by the web app
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout (seconds)
    #[serde(default = "default_report_timeout")]
    pub timeout_seconds: u64,
}

fn default_report_timeout() -> u64 {
    30
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            web_app_url: None,
            api_key: None,
            timeout_seconds: default_report_timeout(),
        }
    }
}

impl ReportConfig {
    /// Whether both URL and API key are present
    pub fn is_configured(&self) -> bool {
        self.web_app_url.is_some() && self.api_key.is_some()
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for ShopTally's own log events
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ShopTallyError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ShopTallyError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(path) = std::env::var("SHOPTALLY_STORAGE_PATH") {
            tracing::debug!(path = %path, "Env override: SHOPTALLY_STORAGE_PATH");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(quota) = std::env::var("SHOPTALLY_QUOTA_BYTES") {
            match quota.parse::<u64>() {
                Ok(v) => self.storage.quota_bytes = v,
                Err(_) => tracing::warn!("Invalid SHOPTALLY_QUOTA_BYTES: {}", quota),
            }
        }

        if let Ok(url) = std::env::var("SHOPTALLY_GAS_WEB_APP_URL") {
            self.report.web_app_url = Some(url);
        }

        if let Ok(key) = std::env::var("SHOPTALLY_GAS_API_KEY") {
            self.report.api_key = Some(key);
        }

        if let Ok(timeout) = std::env::var("SHOPTALLY_REPORT_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.report.timeout_seconds = v,
                Err(_) => tracing::warn!("Invalid SHOPTALLY_REPORT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(level) = std::env::var("SHOPTALLY_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            tracing::info!("Using storage path override from CLI: {}", path.display());
            self.storage.path = Some(path.clone());
        }

        if cli.verbose {
            self.logging.level = "debug".to_string();
        }

        if cli.json_logs {
            self.logging.json_format = true;
        }
    }

    /// Resolved database path: the configured one or the platform default
    pub fn storage_path(&self) -> Result<PathBuf> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => SqliteStore::default_path(),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if a limit is zero, the log level is unknown, or the
    /// web app URL is malformed
    pub fn validate(&self) -> Result<()> {
        if self.storage.quota_bytes == 0 {
            return Err(
                ShopTallyError::Config("storage.quota_bytes must be greater than 0".into()).into(),
            );
        }

        if self.report.timeout_seconds == 0 {
            return Err(ShopTallyError::Config(
                "report.timeout_seconds must be greater than 0".into(),
            )
            .into());
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ShopTallyError::Config(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            ))
            .into());
        }

        if let Some(url) = &self.report.web_app_url {
            let parsed = url::Url::parse(url).map_err(|e| {
                ShopTallyError::Config(format!("Invalid report.web_app_url '{}': {}", url, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ShopTallyError::Config(format!(
                    "report.web_app_url must use http or https, got '{}'",
                    parsed.scheme()
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            "SHOPTALLY_STORAGE_PATH",
            "SHOPTALLY_QUOTA_BYTES",
            "SHOPTALLY_GAS_WEB_APP_URL",
            "SHOPTALLY_GAS_API_KEY",
            "SHOPTALLY_REPORT_TIMEOUT_SECONDS",
            "SHOPTALLY_LOG_LEVEL",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.report.timeout_seconds, 30);
        assert!(!config.report.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml_fills_defaults() {
        let yaml = "report:\n  web_app_url: https://script.example.com/exec\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.report.web_app_url.as_deref(),
            Some("https://script.example.com/exec")
        );
        assert_eq!(config.report.timeout_seconds, 30);
        assert_eq!(config.storage.quota_bytes, 5 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        clear_env();
        let config = Config::load("/nonexistent/config.yaml", &Cli::default()).unwrap();
        assert!(config.storage.path.is_none());
    }

    #[test]
    #[serial]
    fn test_load_reads_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "storage:\n  path: /tmp/shop.db\n  quota_bytes: 1024\nreport:\n  api_key: secret\n",
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/shop.db")));
        assert_eq!(config.storage.quota_bytes, 1024);
        assert_eq!(config.report.api_key.as_deref(), Some("secret"));
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "storage: [unclosed").unwrap();

        let err = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("SHOPTALLY_GAS_WEB_APP_URL", "https://env.example.com/exec");
        std::env::set_var("SHOPTALLY_GAS_API_KEY", "env-key");
        std::env::set_var("SHOPTALLY_QUOTA_BYTES", "2048");

        let config = Config::load("/nonexistent/config.yaml", &Cli::default()).unwrap();
        assert_eq!(
            config.report.web_app_url.as_deref(),
            Some("https://env.example.com/exec")
        );
        assert!(config.report.is_configured());
        assert_eq!(config.storage.quota_bytes, 2048);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_number_is_ignored() {
        clear_env();
        std::env::set_var("SHOPTALLY_QUOTA_BYTES", "lots");
        let config = Config::load("/nonexistent/config.yaml", &Cli::default()).unwrap();
        assert_eq!(config.storage.quota_bytes, 5 * 1024 * 1024);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_storage_path_wins_over_env() {
        clear_env();
        std::env::set_var("SHOPTALLY_STORAGE_PATH", "/from/env.db");
        let cli = Cli {
            storage_path: Some(PathBuf::from("/from/cli.db")),
            ..Cli::default()
        };

        let config = Config::load("/nonexistent/config.yaml", &cli).unwrap();
        assert_eq!(config.storage_path().unwrap(), PathBuf::from("/from/cli.db"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_logging_overrides() {
        clear_env();
        std::env::set_var("SHOPTALLY_LOG_LEVEL", "info");
        let config = Config::load("/nonexistent/config.yaml", &Cli::default()).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);

        let cli = Cli {
            verbose: true,
            json_logs: true,
            ..Cli::default()
        };
        let config = Config::load("/nonexistent/config.yaml", &cli).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        clear_env();
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "INFO".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_quota() {
        let mut config = Config::default();
        config.storage.quota_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.report.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.report.web_app_url = Some("not a url".to_string());
        assert!(config.validate().is_err());

        config.report.web_app_url = Some("ftp://example.com/exec".to_string());
        assert!(config.validate().is_err());

        config.report.web_app_url = Some("https://script.google.com/macros/s/x/exec".to_string());
        assert!(config.validate().is_ok());
    }
}
