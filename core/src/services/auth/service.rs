//! Main authentication service implementation

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::token::{TokenKind, TokenPair};
use crate::domain::entities::user::Identity;
use crate::errors::{AuthError, DomainError};
use crate::repositories::{CredentialAuthenticator, IdentityResolver, TokenLedger};
use crate::services::token::{LogoutOutcome, TokenService};
use crate::services::transport::ensure_token_length;

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome<I: Identity> {
    pub identity: I,
    pub tokens: TokenPair,
}

/// Authentication service for the complete session flow
pub struct AuthService<L, R, A>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    /// Email/password checks
    authenticator: Arc<A>,
    /// Token service for JWT management
    token_service: Arc<TokenService<L, R>>,
}

impl<L, R, A> AuthService<L, R, A>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    pub fn new(authenticator: Arc<A>, token_service: Arc<TokenService<L, R>>) -> Self {
        Self {
            authenticator,
            token_service,
        }
    }

    pub fn token_service(&self) -> &TokenService<L, R> {
        &self.token_service
    }

    /// Check credentials and open a session
    ///
    /// # Errors
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    /// * `AuthError::UserInactive` - Account disabled
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome<A::Identity>, DomainError> {
        let identity = self.authenticate(email, password).await?;
        let tokens = self.token_service.login(identity.id()).await?;
        Ok(LoginOutcome { identity, tokens })
    }

    /// Same as [`login`](Self::login), restricted to admins
    ///
    /// # Errors
    /// * `AuthError::AdminAccessOnly` - Valid credentials of a non-admin
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome<A::Identity>, DomainError> {
        let identity = self.authenticate(email, password).await?;
        if !identity.is_admin() {
            tracing::warn!(user_id = %identity.id(), "Admin login refused for non-admin user");
            return Err(AuthError::AdminAccessOnly.into());
        }
        let tokens = self.token_service.login(identity.id()).await?;
        Ok(LoginOutcome { identity, tokens })
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        ensure_token_length(refresh_token)?;
        self.token_service.refresh(refresh_token).await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<LogoutOutcome, DomainError> {
        ensure_token_length(refresh_token)?;
        self.token_service.logout(refresh_token).await
    }

    /// Verify an access credential presented on a protected request
    pub async fn authenticate_access(&self, access_token: &str) -> Result<R::Identity, DomainError> {
        ensure_token_length(access_token)?;
        self.token_service
            .verify(access_token, TokenKind::Access)
            .await
    }

    /// Current state of an already authenticated identity
    ///
    /// # Errors
    /// * `TokenError::UnknownIdentity` - Account removed since verification
    /// * `TokenError::IdentityInactive` - Account disabled since verification
    pub async fn current_identity(&self, user_id: Uuid) -> Result<R::Identity, DomainError> {
        self.token_service
            .verifier()
            .resolve_identity(user_id)
            .await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<A::Identity, DomainError> {
        let identity = self
            .authenticator
            .authenticate(email, password)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Login failed: invalid credentials");
                AuthError::InvalidCredentials
            })?;

        if !identity.is_active() {
            tracing::warn!(user_id = %identity.id(), "Login refused for inactive user");
            return Err(AuthError::UserInactive.into());
        }

        Ok(identity)
    }
}

/// Admin gate for an already verified identity
pub fn require_admin<I: Identity>(identity: &I) -> Result<(), AuthError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermissions)
    }
}
