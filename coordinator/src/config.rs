//! Configuration for the coordinator

use serde::{Deserialize, Serialize};

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Embedded order ledger configuration
    pub ledger: order_ledger::Config,

    /// Embedded rating service configuration
    pub rating: rating_service::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "coordinator".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            ledger: order_ledger::Config::default(),
            rating: rating_service::Config::default(),
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
        config.ledger = order_ledger::Config::from_env()?;
        config.rating = rating_service::Config::from_env()?;

        if let Ok(name) = std::env::var("COORDINATOR_SERVICE_NAME") {
            config.service_name = name;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "coordinator");
        assert_eq!(config.ledger.service_name, "order-ledger");
        assert_eq!(config.rating.retry.max_retries, 2);
    }
}
