//! Configuration module for the cinema backend.
//!
//! Loads configuration from `config.toml` with environment variable overrides.

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::AppError;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Server configuration
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub jwt_secret: Option<String>,
}

// Custom Debug implementation to avoid exposing jwt_secret
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "jwt_secret",
                &self.jwt_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/cinema.db")
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` in current directory (optional)
    /// 3. Environment variables with `CINEMA_` prefix
    ///
    /// Environment variables use double underscore for nesting:
    /// - `CINEMA_SERVER__PORT=9000` sets `server.port`
    /// - `CINEMA_DATABASE__PATH=/data/db.sqlite` sets `database.path`
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from(config_path: &str) -> Result<Self, AppError> {
        let config = ConfigLoader::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "./data/cinema.db")?
            .add_source(File::with_name(config_path).required(false))
            // CINEMA_SERVER__PORT=9000 -> server.port = 9000
            .add_source(
                Environment::with_prefix("CINEMA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for required fields.
    fn validate(&self) -> Result<(), AppError> {
        // JWT secret may be injected later (a random one is generated at
        // startup for development), so only warn here.
        if self.server.jwt_secret.is_none() {
            tracing::warn!("JWT secret not configured - a random secret will be generated");
        }

        Ok(())
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::{IpAddr, SocketAddr};
        let ip: IpAddr = self.server.host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid host '{}', using 0.0.0.0", self.server.host);
            "0.0.0.0".parse().unwrap()
        });
        SocketAddr::new(ip, self.server.port)
    }
}
