//! Database module - MySQL implementations using SQLx
//!
//! This module provides database access layer implementations including:
//! - Connection pool management
//! - Schema bootstrap for `users` and `jwt_tokens`
//! - The transactional token ledger and the user store

pub mod connection;
pub mod mysql;
pub mod schema;


// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::{MySqlLedgerTransaction, MySqlTokenLedger, MySqlUserStore};
pub use schema::ensure_schema;
