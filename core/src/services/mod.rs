//! Business services containing the token lifecycle and its use cases.

pub mod auth;
pub mod token;
pub mod transport;

// Re-export commonly used types
pub use auth::{require_admin, AuthService, LoginOutcome, UserRegistration};
pub use token::{
    Clock, FixedClock, LogoutOutcome, RevocationManager, RotationCoordinator, SystemClock,
    TokenIssuer, TokenService, TokenServiceConfig, TokenVerifier,
};
pub use transport::{
    ensure_token_length, ensure_transport_agreement, BearerTokens, CookieDirective,
    CredentialRendering, TransportMode,
};
