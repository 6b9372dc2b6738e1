//! Configuration for the rating service

use crate::validator::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rating service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Validator retry behavior
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "rating-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry settings for cross-service validator calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,

    /// Cap on the backoff delay, in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    /// Build the runtime retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(retries) = std::env::var("RATING_RETRY_MAX") {
            config.retry.max_retries = retries
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid RATING_RETRY_MAX: {}", e)))?;
        }

        if let Ok(delay) = std::env::var("RATING_RETRY_INITIAL_DELAY_MS") {
            config.retry.initial_delay_ms = delay.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid RATING_RETRY_INITIAL_DELAY_MS: {}", e))
            })?;
        }

        Ok(config)
    }
}
