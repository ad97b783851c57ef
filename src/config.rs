//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

use chrono::Duration;

use crate::domain::Balance;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Session credential lifetime in seconds
    pub credential_ttl_secs: i64,

    /// Opening balance for new accounts, in minor units
    pub opening_balance_minor: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let credential_ttl_secs = env::var("CREDENTIAL_TTL_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CREDENTIAL_TTL_SECS"))?;
        if credential_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("CREDENTIAL_TTL_SECS"));
        }

        let opening_balance_minor = env::var("OPENING_BALANCE_MINOR")
            .unwrap_or_else(|_| "1000000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("OPENING_BALANCE_MINOR"))?;
        if Balance::new(opening_balance_minor).is_err() {
            return Err(ConfigError::InvalidValue("OPENING_BALANCE_MINOR"));
        }

        Ok(Self {
            host,
            port,
            environment,
            credential_ttl_secs,
            opening_balance_minor,
        })
    }

    /// Credential lifetime as a duration
    pub fn credential_ttl(&self) -> Duration {
        Duration::seconds(self.credential_ttl_secs)
    }

    /// Opening balance for newly opened accounts
    pub fn opening_balance(&self) -> Balance {
        Balance::new(self.opening_balance_minor).expect("validated at load time")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            credential_ttl_secs: 900,
            opening_balance_minor: 1_000_000,
        }
    }

    #[test]
    fn test_credential_ttl_duration() {
        let config = test_config();
        assert_eq!(config.credential_ttl(), Duration::minutes(15));
    }

    #[test]
    fn test_opening_balance() {
        let config = test_config();
        assert_eq!(config.opening_balance().value(), 1_000_000);
    }

    #[test]
    fn test_is_production() {
        let mut config = test_config();
        assert!(!config.is_production());
        config.environment = "production".to_string();
        assert!(config.is_production());
    }
}
