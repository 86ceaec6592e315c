//! MySQL repository implementations

mod token_ledger_impl;
mod user_store_impl;

pub use token_ledger_impl::{MySqlLedgerTransaction, MySqlTokenLedger};
pub use user_store_impl::MySqlUserStore;

use tk_core::errors::DomainError;

/// Connectivity and query failures are retryable store errors
pub(crate) fn store_error(context: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "{}", context);
    DomainError::store(format!("{}: {}", context, e))
}

/// A row that cannot be mapped back to an entity
pub(crate) fn decode_error(column: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to decode column {}: {}", column, e),
    }
}
