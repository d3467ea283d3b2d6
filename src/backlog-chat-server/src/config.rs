//! Server configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Backlog space base URL.
pub const ENV_BACKLOG_BASE_URL: &str = "BACKLOG_BASE_URL";
/// Google Chat API base URL.
pub const ENV_GOOGLE_CHAT_API: &str = "GOOGLE_CHAT_API";
/// Listen address override.
pub const ENV_LISTEN_ADDR: &str = "BACKLOG_CHAT_LISTEN_ADDR";
/// Delivery timeout in seconds.
pub const ENV_DELIVERY_TIMEOUT: &str = "BACKLOG_CHAT_DELIVERY_TIMEOUT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("invalid value for `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Backlog space URL used for deep links (e.g. "https://example.backlog.com").
    pub backlog_base_url: String,

    /// Google Chat API base URL; the inbound request path is joined onto it.
    pub google_chat_api: String,

    /// Listen address (e.g. "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Timeout for one delivery to the chat API, in seconds.
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_delivery_timeout() -> u64 {
    10
}

impl ServerConfig {
    /// Create a configuration with default listen address and timeout.
    pub fn new(backlog_base_url: impl Into<String>, google_chat_api: impl Into<String>) -> Self {
        Self {
            backlog_base_url: backlog_base_url.into(),
            google_chat_api: google_chat_api.into(),
            listen_addr: default_listen_addr(),
            delivery_timeout: default_delivery_timeout(),
        }
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let mut config = Self::new(
            required(ENV_BACKLOG_BASE_URL)?,
            required(ENV_GOOGLE_CHAT_API)?,
        );

        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            config.listen_addr = addr;
        }

        if let Some(timeout) = lookup(ENV_DELIVERY_TIMEOUT) {
            config.delivery_timeout = timeout.parse().map_err(|e| ConfigError::Invalid {
                name: ENV_DELIVERY_TIMEOUT,
                reason: format!("`{timeout}` is not a number of seconds: {e}"),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that both URLs parse and the timeout is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (ENV_BACKLOG_BASE_URL, &self.backlog_base_url),
            (ENV_GOOGLE_CHAT_API, &self.google_chat_api),
        ] {
            Url::parse(value).map_err(|e| ConfigError::Invalid {
                name,
                reason: format!("`{value}` is not a URL: {e}"),
            })?;
        }

        if self.delivery_timeout == 0 {
            return Err(ConfigError::Invalid {
                name: ENV_DELIVERY_TIMEOUT,
                reason: "must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_BACKLOG_BASE_URL, "https://backlog.com/"),
            (ENV_GOOGLE_CHAT_API, "https://chat.googleapis.com"),
        ]))
        .unwrap();
        assert_eq!(config.backlog_base_url, "https://backlog.com/");
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.delivery_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_BACKLOG_BASE_URL, "https://backlog.com"),
            (ENV_GOOGLE_CHAT_API, "https://chat.googleapis.com"),
            (ENV_LISTEN_ADDR, "127.0.0.1:9000"),
            (ENV_DELIVERY_TIMEOUT, "3"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.delivery_timeout, 3);
    }

    #[test]
    fn test_missing_required_variable() {
        let err = ServerConfig::from_lookup(lookup(&[(ENV_BACKLOG_BASE_URL, "https://backlog.com")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_GOOGLE_CHAT_API)));
    }

    #[test]
    fn test_invalid_values() {
        let err = ServerConfig::from_lookup(lookup(&[
            (ENV_BACKLOG_BASE_URL, "https://backlog.com"),
            (ENV_GOOGLE_CHAT_API, "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_GOOGLE_CHAT_API, .. }));

        let err = ServerConfig::from_lookup(lookup(&[
            (ENV_BACKLOG_BASE_URL, "https://backlog.com"),
            (ENV_GOOGLE_CHAT_API, "https://chat.googleapis.com"),
            (ENV_DELIVERY_TIMEOUT, "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("`soon` is not a number of seconds"));
    }

    #[test]
    fn test_config_file_defaults() {
        let config: ServerConfig = serde_json::from_str(
            r#"{"backlog_base_url": "https://backlog.com", "google_chat_api": "https://chat.googleapis.com"}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            ServerConfig::new("https://backlog.com", "https://chat.googleapis.com")
        );
    }
}
