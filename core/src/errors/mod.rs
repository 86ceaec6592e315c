//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use thiserror::Error;
use tk_shared::ConfigError;

/// Coarse error taxonomy shared by every layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad, expired, revoked or missing credential; unknown or inactive identity
    Validation,
    /// Valid identity lacking a privilege
    Authorization,
    /// Ledger or identity store unreachable; retryable
    StoreUnavailable,
    /// Fatal misconfiguration detected at startup
    Configuration,
    /// Malformed request input
    BadRequest,
    Internal,
}

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        DomainError::BadRequest {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        DomainError::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        DomainError::Configuration {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::BadRequest { .. } => ErrorCategory::BadRequest,
            DomainError::StoreUnavailable { .. } => ErrorCategory::StoreUnavailable,
            DomainError::Configuration { .. } => ErrorCategory::Configuration,
            DomainError::Internal { .. } => ErrorCategory::Internal,
            DomainError::Token(TokenError::TokenGenerationFailed) => ErrorCategory::Internal,
            DomainError::Token(_) => ErrorCategory::Validation,
            DomainError::Auth(AuthError::InvalidCredentials) => ErrorCategory::Validation,
            DomainError::Auth(_) => ErrorCategory::Authorization,
        }
    }

    /// Only store outages are worth retrying
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::StoreUnavailable
    }

    /// The token error carried by this error, if any
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for DomainError {
    fn from(err: ConfigError) -> Self {
        DomainError::configuration(err.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
