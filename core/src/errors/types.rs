//! Error types for credential verification and authentication
//!
//! Messages here are for logs. The HTTP layer decides what a client sees and
//! never reveals which verification stage rejected a credential.

use thiserror::Error;

use crate::domain::entities::token::{TokenKind, VerificationStage};

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid signature or malformed token")]
    InvalidSignature,

    #[error("Wrong token kind, expected {expected}")]
    WrongTokenKind { expected: TokenKind },

    #[error("Token subject missing or malformed")]
    MalformedToken,

    #[error("Token not found in ledger")]
    UnknownToken,

    #[error("Token blacklisted or expired")]
    TokenInvalid,

    #[error("Token subject does not resolve to an identity")]
    UnknownIdentity,

    #[error("Identity is inactive")]
    IdentityInactive,

    #[error("Token missing")]
    MissingToken,

    #[error("Token too long: {length} characters")]
    TokenTooLong { length: usize },

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

impl TokenError {
    /// Verification stage that produced this error, if any
    pub fn stage(&self) -> Option<VerificationStage> {
        match self {
            TokenError::InvalidSignature => Some(VerificationStage::Signature),
            TokenError::WrongTokenKind { .. } => Some(VerificationStage::Kind),
            TokenError::MalformedToken => Some(VerificationStage::Subject),
            TokenError::UnknownToken => Some(VerificationStage::LedgerLookup),
            TokenError::TokenInvalid => Some(VerificationStage::LedgerValidity),
            TokenError::UnknownIdentity | TokenError::IdentityInactive => {
                Some(VerificationStage::Identity)
            }
            TokenError::MissingToken
            | TokenError::TokenTooLong { .. }
            | TokenError::TokenGenerationFailed => None,
        }
    }
}

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User account is inactive")]
    UserInactive,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Admin access only")]
    AdminAccessOnly,
}
