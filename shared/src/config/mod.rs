//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT signing, transport mode and cookie attributes
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration
//!
//! Sources are layered: built-in defaults, then `config/default.toml`, then
//! `config/<environment>.toml`, then `TOKENKEEP__`-prefixed environment variables
//! (for example `TOKENKEEP__AUTH__JWT__SECRET`).

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::{AuthConfig, CookieConfig, JwtConfig, TransportMode};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Prefix of environment variables overriding file configuration
pub const ENV_PREFIX: &str = "TOKENKEEP";

const SUPPORTED_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Transport mode mismatch: auth uses {auth}, server uses {server}")]
    TransportMismatch {
        auth: TransportMode,
        server: TransportMode,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load `.env` files and the layered configuration for the current environment
    pub fn load() -> Result<Self, ConfigError> {
        let env = Environment::from_env();
        let _ = dotenvy::from_filename(env.env_file());
        let _ = dotenvy::dotenv();

        let config: Self = Self::builder(env)?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Defaults plus the optional config files for `env`.
    ///
    /// Callers add further sources on top before building.
    pub fn builder(env: Environment) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self {
            environment: env,
            logging: LoggingConfig::for_environment(env),
            ..Default::default()
        };

        Ok(Config::builder()
            .add_source(Config::try_from(&defaults)?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&env.config_file()).required(false)))
    }

    /// Startup checks. Any error here must stop the process before it serves traffic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.transport != self.server.transport {
            return Err(ConfigError::TransportMismatch {
                auth: self.auth.transport,
                server: self.server.transport,
            });
        }

        let jwt = &self.auth.jwt;
        if !SUPPORTED_ALGORITHMS
            .iter()
            .any(|name| name.eq_ignore_ascii_case(jwt.algorithm.trim()))
        {
            return Err(ConfigError::Invalid(format!(
                "Unsupported JWT algorithm {}, expected one of {:?}",
                jwt.algorithm, SUPPORTED_ALGORITHMS
            )));
        }

        if jwt.secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT secret must not be empty".into()));
        }

        if jwt.is_using_default_secret() {
            if self.environment.is_production() {
                return Err(ConfigError::Invalid(
                    "Default JWT secret is not allowed in production".into(),
                ));
            }
            tracing::warn!("Using the default JWT secret, set TOKENKEEP__AUTH__JWT__SECRET");
        }

        if jwt.access_token_expiry_minutes <= 0 || jwt.refresh_token_expiry_days <= 0 {
            return Err(ConfigError::Invalid("Token lifetimes must be positive".into()));
        }

        if jwt.access_token_expiry_seconds()? >= jwt.refresh_token_expiry_seconds()? {
            return Err(ConfigError::Invalid(
                "Access token lifetime must be shorter than refresh token lifetime".into(),
            ));
        }

        match self.auth.cookie.same_site.to_lowercase().as_str() {
            "strict" | "lax" | "none" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "Invalid cookie SameSite value: {}",
                    other
                )))
            }
        }

        Ok(())
    }
}
