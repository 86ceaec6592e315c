//! Shared application state

use std::sync::Arc;

use tk_core::repositories::{CredentialAuthenticator, IdentityResolver, TokenLedger};
use tk_core::services::{AuthService, TransportMode};
use tk_shared::CookieConfig;

use crate::middleware::auth::{AccessVerifier, JwtAuth};

const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024;

/// Application state shared across all handlers
pub struct AppState<L, R, A>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    pub auth_service: Arc<AuthService<L, R, A>>,
    /// Transport the HTTP layer renders and extracts credentials with
    pub transport: TransportMode,
    pub cookies: CookieConfig,
    /// Upper bound for request bodies in bytes
    pub max_payload_size: usize,
}

impl<L, R, A> AppState<L, R, A>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    pub fn new(
        auth_service: Arc<AuthService<L, R, A>>,
        transport: TransportMode,
        cookies: CookieConfig,
    ) -> Self {
        Self {
            auth_service,
            transport,
            cookies,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }

    pub fn with_max_payload_size(mut self, bytes: usize) -> Self {
        self.max_payload_size = bytes;
        self
    }

    /// Authentication middleware bound to this state's service and transport
    pub fn jwt_auth(&self) -> JwtAuth {
        let verifier: Arc<dyn AccessVerifier> = self.auth_service.clone();
        JwtAuth::new(verifier, self.transport, self.cookies.access_name.clone())
    }
}
