//! # Infrastructure Layer
//!
//! Concrete persistence for the Tokenkeep token engine:
//! - **Database**: MySQL connection pool, schema bootstrap, the token ledger
//!   and the user store, all on SQLx

/// Database module - MySQL implementations using SQLx
pub mod database;

pub use database::{ensure_schema, DatabasePool, MySqlLedgerTransaction, MySqlTokenLedger, MySqlUserStore};

use tk_core::errors::DomainError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => DomainError::store(e.to_string()),
            InfrastructureError::Config(message) => DomainError::configuration(message),
        }
    }
}
