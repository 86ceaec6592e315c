//! Identity collaborator traits
//!
//! The token engine never owns identities; it only resolves them by id. Login
//! additionally needs an authenticator that checks an email/password pair, and
//! account bootstrap needs a registry to store new users.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::{Identity, User};
use crate::errors::DomainError;

/// Resolves a credential subject to an identity
#[async_trait]
pub trait IdentityResolver: Send + Sync + 'static {
    type Identity: Identity;

    /// # Returns
    /// * `Ok(Some(identity))` - Identity exists (active or not)
    /// * `Ok(None)` - No identity with this id
    /// * `Err(DomainError)` - Store error
    async fn resolve(&self, id: Uuid) -> Result<Option<Self::Identity>, DomainError>;
}

/// Checks login credentials
#[async_trait]
pub trait CredentialAuthenticator: Send + Sync + 'static {
    type Identity: Identity;

    /// # Returns
    /// * `Ok(Some(identity))` - Email known and password matches
    /// * `Ok(None)` - Unknown email or wrong password
    /// * `Err(DomainError)` - Store error
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Self::Identity>, DomainError>;
}

/// Stores new accounts
#[async_trait]
pub trait UserRegistry: Send + Sync + 'static {
    /// # Returns
    /// * `Ok(true)` - User stored
    /// * `Ok(false)` - Email already registered (compared case-insensitively)
    /// * `Err(DomainError)` - Store error
    async fn create(&self, user: &User) -> Result<bool, DomainError>;
}
