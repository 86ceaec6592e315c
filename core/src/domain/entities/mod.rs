//! Domain entities representing core business objects.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{
    Claims, IssuedToken, LedgerRecord, TokenKind, TokenPair, VerificationStage,
    MAX_TOKEN_LENGTH,
};
pub use user::{Identity, User};
