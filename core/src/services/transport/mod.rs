//! Credential transport: how issued tokens reach the client and come back
//!
//! Exactly one [`TransportMode`] is active per deployment. The engine and the
//! HTTP layer are configured separately and must agree before serving.

mod bearer;
mod cookie;

pub use bearer::{merge_into_body, BearerTokens};
pub use cookie::{clear_directives, set_directives, CookieDirective};
pub use tk_shared::TransportMode;

use tk_shared::CookieConfig;

use crate::domain::entities::token::{TokenPair, MAX_TOKEN_LENGTH};
use crate::errors::{DomainError, TokenError};

/// Fails with a configuration error unless both sides use the same mode
pub fn ensure_transport_agreement(
    engine: TransportMode,
    http: TransportMode,
) -> Result<(), DomainError> {
    if engine != http {
        return Err(DomainError::configuration(format!(
            "Transport mode mismatch: token engine uses {}, HTTP layer uses {}",
            engine, http
        )));
    }
    Ok(())
}

/// Rejects oversized raw credentials before any decode work
pub fn ensure_token_length(token: &str) -> Result<(), TokenError> {
    let length = token.chars().count();
    if length > MAX_TOKEN_LENGTH {
        return Err(TokenError::TokenTooLong { length });
    }
    Ok(())
}

/// What the HTTP layer must emit for a freshly issued pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRendering {
    /// Set these cookies, leave the body alone
    Cookies(Vec<CookieDirective>),
    /// Merge this object into the JSON body under `tokens`
    Body(BearerTokens),
}

impl CredentialRendering {
    pub fn for_pair(mode: TransportMode, pair: &TokenPair, cookies: &CookieConfig) -> Self {
        match mode {
            TransportMode::Cookie => CredentialRendering::Cookies(set_directives(pair, cookies)),
            TransportMode::Bearer => CredentialRendering::Body(BearerTokens::from_pair(pair)),
        }
    }
}
