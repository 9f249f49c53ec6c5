/// Configuration management for the Cirrus console backend
use crate::error::{ConsoleError, ConsoleResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub console_db: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access-session lifetime in seconds (drives `sessions.expires_at`)
    pub session_ttl_secs: i64,
    /// Refresh-token lifetime in seconds, typically much longer than the
    /// session lifetime
    pub refresh_ttl_secs: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ConsoleConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ConsoleResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("CONSOLE_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("CONSOLE_PORT")
            .unwrap_or_else(|_| "3909".to_string())
            .parse()
            .map_err(|_| ConsoleError::Validation("Invalid port number".to_string()))?;
        let version = env::var("CONSOLE_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("CONSOLE_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let console_db = env::var("CONSOLE_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("console.sqlite"));

        let jwt_secret = env::var("CONSOLE_JWT_SECRET")
            .map_err(|_| ConsoleError::Validation("JWT secret required".to_string()))?;
        let session_ttl_secs = env::var("CONSOLE_SESSION_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);
        let refresh_ttl_secs = env::var("CONSOLE_REFRESH_TTL_SECS")
            .unwrap_or_else(|_| "2592000".to_string())
            .parse()
            .unwrap_or(2_592_000);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ConsoleConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                console_db,
            },
            authentication: AuthConfig {
                jwt_secret,
                session_ttl_secs,
                refresh_ttl_secs,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ConsoleResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ConsoleError::Validation(
                "Hostname cannot be empty".to_string(),
            ));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(ConsoleError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.session_ttl_secs <= 0 || self.authentication.refresh_ttl_secs <= 0 {
            return Err(ConsoleError::Validation(
                "Token lifetimes must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
