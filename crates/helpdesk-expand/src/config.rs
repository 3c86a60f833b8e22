//! Expansion and fetcher configuration.
//!
//! Configuration is loaded from environment variables with defaults suitable
//! for local development.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::retry::RetryConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}

/// Settings of the expansion resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandConfig {
    /// Budget for one expansion, in milliseconds.
    pub deadline_ms: u64,

    /// Deepest path accepted, in segments.
    pub max_depth: usize,

    /// Field holding entity identifiers.
    pub id_field: String,

    /// Elements of one array relation expanded at a time.
    pub fan_out: usize,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 5_000,
            max_depth: 3,
            id_field: "id".to_string(),
            fan_out: 8,
        }
    }
}

impl ExpandConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EXPAND_DEADLINE_MS`: Expansion budget (default: 5000)
    /// - `EXPAND_MAX_DEPTH`: Deepest accepted path (default: 3)
    /// - `EXPAND_ID_FIELD`: Identifier field (default: id)
    /// - `EXPAND_FAN_OUT`: Array elements expanded at a time (default: 8)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        Self {
            deadline_ms: parsed(&lookup, "EXPAND_DEADLINE_MS").unwrap_or(default.deadline_ms),
            max_depth: parsed(&lookup, "EXPAND_MAX_DEPTH").unwrap_or(default.max_depth),
            id_field: lookup("EXPAND_ID_FIELD")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default.id_field),
            fan_out: parsed(&lookup, "EXPAND_FAN_OUT").unwrap_or(default.fan_out),
        }
    }

    /// Expansion budget as a Duration.
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Reject settings that would disable expansion by accident.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadline_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "EXPAND_DEADLINE_MS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "EXPAND_MAX_DEPTH".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.fan_out == 0 {
            return Err(ConfigError::InvalidValue {
                key: "EXPAND_FAN_OUT".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings of the HTTP related-entity fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Base URL routes are joined onto (e.g., "https://api.helpdesk.dev").
    pub base_url: String,

    /// API key for service-to-service authentication.
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum attempts per fetch.
    pub max_retries: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1337".to_string(),
            api_key: None,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl FetcherConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RELATED_API_URL`: Base URL (default: http://localhost:1337)
    /// - `RELATED_API_KEY`: Bearer key for the related API
    /// - `RELATED_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    /// - `RELATED_MAX_RETRIES`: Maximum attempts (default: 3)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        Self {
            base_url: lookup("RELATED_API_URL").unwrap_or(default.base_url),
            api_key: lookup("RELATED_API_KEY"),
            timeout_secs: parsed(&lookup, "RELATED_TIMEOUT_SECS").unwrap_or(default.timeout_secs),
            max_retries: parsed(&lookup, "RELATED_MAX_RETRIES").unwrap_or(default.max_retries),
        }
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a full URL by appending a route to the base URL.
    pub fn url(&self, route: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let route = route.trim_start_matches('/');
        format!("{}/{}", base, route)
    }

    /// Check if API key authentication is available.
    pub fn has_auth(&self) -> bool {
        self.api_key.is_some()
    }

    /// Retry policy derived from `max_retries`.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retries.max(1),
            ..RetryConfig::default()
        }
    }

    /// Validate that the configuration is usable in production.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            return Err(ConfigError::MissingEnvVar("RELATED_API_KEY".to_string()));
        }
        if reqwest::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "RELATED_API_URL".to_string(),
                message: format!("'{}' is not a valid URL", self.base_url),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_expand_defaults() {
        let config = ExpandConfig::default();
        assert_eq!(config.deadline(), Duration::from_secs(5));
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.id_field, "id");
        assert_eq!(config.fan_out, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expand_from_lookup() {
        let config = ExpandConfig::from_lookup(lookup(&[
            ("EXPAND_DEADLINE_MS", "250"),
            ("EXPAND_MAX_DEPTH", "2"),
            ("EXPAND_ID_FIELD", "_id"),
            ("EXPAND_FAN_OUT", "4"),
        ]));
        assert_eq!(config.deadline_ms, 250);
        assert_eq!(config.fan_out, 4);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.id_field, "_id");
    }

    #[test]
    fn test_expand_bad_values_fall_back() {
        let config = ExpandConfig::from_lookup(lookup(&[
            ("EXPAND_DEADLINE_MS", "soon"),
            ("EXPAND_ID_FIELD", " "),
        ]));
        assert_eq!(config, ExpandConfig::default());
    }

    #[test]
    fn test_expand_validate() {
        let config = ExpandConfig {
            deadline_ms: 0,
            ..ExpandConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ExpandConfig {
            max_depth: 0,
            ..ExpandConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ExpandConfig {
            fan_out: 0,
            ..ExpandConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fetcher_url() {
        let config = FetcherConfig {
            base_url: "https://api.example.com/".to_string(),
            ..FetcherConfig::default()
        };
        assert_eq!(config.url("/users/u-1"), "https://api.example.com/users/u-1");
        assert_eq!(config.url("users/u-1"), "https://api.example.com/users/u-1");
    }

    #[test]
    fn test_fetcher_from_lookup() {
        let config = FetcherConfig::from_lookup(lookup(&[
            ("RELATED_API_URL", "http://related:8080"),
            ("RELATED_API_KEY", "secret"),
            ("RELATED_MAX_RETRIES", "0"),
        ]));
        assert_eq!(config.base_url, "http://related:8080");
        assert!(config.has_auth());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry_config().max_attempts, 1);
    }

    #[test]
    fn test_validate_for_production() {
        let mut config = FetcherConfig::default();
        assert!(config.validate_for_production().is_err());

        config.api_key = Some("key".to_string());
        assert!(config.validate_for_production().is_ok());

        config.base_url = "not a url".to_string();
        assert!(config.validate_for_production().is_err());
    }
}
