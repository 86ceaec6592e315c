//! Domain layer containing the ledger record, credential payload and identity entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
