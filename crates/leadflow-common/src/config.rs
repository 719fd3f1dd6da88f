//! Configuration for Leadflow

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Status poller configuration
    #[serde(default)]
    pub poller: PollerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the lead-generation service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key for authentication
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Default user identity for campaign operations
    pub user_id: Option<Uuid>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            user_id: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Status poller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Seconds between status checks
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,

    /// Seconds after which an unresolved poll gives up
    #[serde(default = "default_poll_ceiling")]
    pub ceiling_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            ceiling_secs: default_poll_ceiling(),
        }
    }
}

fn default_poll_interval() -> u64 {
    3
}

fn default_poll_ceiling() -> u64 {
    120
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "json" or "text"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from default locations, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let paths = [
            std::path::PathBuf::from("./leadflow.toml"),
            std::path::PathBuf::from("/etc/leadflow/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.poller.interval_secs, 3);
        assert_eq!(config.poller.ceiling_secs, 120);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[api]
base_url = "https://api.example.com"
api_key = "secret"
timeout_secs = 10

[poller]
interval_secs = 5

[logging]
level = "debug"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.api_key.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.poller.interval_secs, 5);
        assert_eq!(config.poller.ceiling_secs, 120);
        assert_eq!(config.logging.level, "debug");
    }
}
