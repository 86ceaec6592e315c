//! # Tokenkeep Core
//!
//! Token lifecycle engine and domain layer for Tokenkeep.
//! This crate contains the domain entities, the ledger and identity interfaces,
//! the issuance / verification / revocation / rotation services and the error
//! types that the infrastructure and API layers build on.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Claims, Identity, IssuedToken, LedgerRecord, TokenKind, TokenPair, User, VerificationStage,
    MAX_TOKEN_LENGTH,
};
pub use errors::{AuthError, DomainError, DomainResult, ErrorCategory, TokenError};
pub use repositories::{
    CredentialAuthenticator, IdentityResolver, InMemoryTokenLedger, InMemoryUserStore,
    LedgerTransaction, TokenLedger,
};
pub use services::{
    require_admin, AuthService, Clock, FixedClock, LoginOutcome, LogoutOutcome,
    RevocationManager, RotationCoordinator, SystemClock, TokenIssuer, TokenService,
    TokenServiceConfig, TokenVerifier, TransportMode,
};
