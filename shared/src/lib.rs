//! Shared configuration and common types for the Tokenkeep server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types, layered loading and startup validation
//! - The error response body returned by the HTTP layer

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, CookieConfig, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, ServerConfig, TransportMode,
};
pub use errors::{error_codes, ErrorResponse};
