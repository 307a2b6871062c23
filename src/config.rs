//! Configuration management for the Farebox API
use crate::error::{FareboxError, FareboxResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> FareboxResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("FAREBOX_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("FAREBOX_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| FareboxError::Validation("Invalid port number".to_string()))?;

        let data_directory: PathBuf = env::var("FAREBOX_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("FAREBOX_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("farebox.sqlite"));

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig { hostname, port },
            storage: StorageConfig {
                data_directory,
                database,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> FareboxResult<()> {
        if self.service.hostname.is_empty() {
            return Err(FareboxError::Validation(
                "Hostname cannot be empty".to_string(),
            ));
        }

        if self.service.port == 0 {
            return Err(FareboxError::Validation(
                "Port cannot be zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                data_directory: "./data".into(),
                database: "./data/farebox.sqlite".into(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn empty_hostname_rejected() {
        let mut config = sample_config();
        config.service.hostname.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_port_rejected() {
        let mut config = sample_config();
        config.service.port = 0;
        assert!(config.validate().is_err());
    }
}
