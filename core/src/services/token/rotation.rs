//! Login, refresh rotation and logout as single ledger transactions

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::token::{TokenKind, TokenPair};
use crate::domain::entities::user::Identity;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{IdentityResolver, LedgerTransaction, TokenLedger};

use super::issuer::TokenIssuer;
use super::revocation::{rollback_quietly, RevocationManager};
use super::verifier::TokenVerifier;

/// Result of a committed logout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub user_id: Uuid,
    /// Access tokens blacklisted along with the refresh token
    pub revoked_access_tokens: u64,
}

/// Composes verifier, revocation manager and issuer into atomic protocols.
///
/// Each public operation runs in one ledger transaction. Any failure rolls the
/// whole operation back, leaving the presented credential as it was.
pub struct RotationCoordinator<L: TokenLedger, R: IdentityResolver> {
    ledger: Arc<L>,
    verifier: Arc<TokenVerifier<L, R>>,
    revocation: Arc<RevocationManager<L>>,
    issuer: Arc<TokenIssuer>,
}

impl<L: TokenLedger, R: IdentityResolver> RotationCoordinator<L, R> {
    pub fn new(
        ledger: Arc<L>,
        verifier: Arc<TokenVerifier<L, R>>,
        revocation: Arc<RevocationManager<L>>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            ledger,
            verifier,
            revocation,
            issuer,
        }
    }

    /// Issue and commit an access + refresh pair
    pub async fn login(&self, owner_id: Uuid) -> Result<TokenPair, DomainError> {
        let mut tx = self.ledger.begin().await?;
        match self.issuer.issue_pair(&mut tx, owner_id).await {
            Ok(pair) => {
                tx.commit().await?;
                tracing::info!(user_id = %owner_id, "Session opened");
                Ok(pair)
            }
            Err(e) => {
                tracing::warn!(user_id = %owner_id, error = %e, "Login rolled back");
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// On commit the old refresh token is blacklisted and exactly one new pair
    /// exists. Of two concurrent rotations of the same token, the one that
    /// fails to flip it gets `TokenInvalid`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let mut tx = self.ledger.begin().await?;
        match self.refresh_in(&mut tx, refresh_token).await {
            Ok((owner_id, pair)) => {
                tx.commit().await?;
                tracing::info!(user_id = %owner_id, "Tokens rotated");
                Ok(pair)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token rotation rolled back");
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    async fn refresh_in(
        &self,
        tx: &mut L::Transaction,
        refresh_token: &str,
    ) -> Result<(Uuid, TokenPair), DomainError> {
        let identity = self
            .verifier
            .verify_in(tx, refresh_token, TokenKind::Refresh)
            .await?;

        if !self.revocation.revoke_one_in(tx, refresh_token).await? {
            return Err(TokenError::TokenInvalid.into());
        }

        let pair = self.issuer.issue_pair(tx, identity.id()).await?;
        Ok((identity.id(), pair))
    }

    /// Blacklist the refresh token and every live access token of its owner.
    ///
    /// Access tokens committed by a concurrent login after the revocation scan
    /// stay valid.
    pub async fn logout(&self, refresh_token: &str) -> Result<LogoutOutcome, DomainError> {
        let mut tx = self.ledger.begin().await?;
        match self.logout_in(&mut tx, refresh_token).await {
            Ok(outcome) => {
                tx.commit().await?;
                tracing::info!(
                    user_id = %outcome.user_id,
                    revoked_access_tokens = outcome.revoked_access_tokens,
                    "Session closed"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Logout rolled back");
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    async fn logout_in(
        &self,
        tx: &mut L::Transaction,
        refresh_token: &str,
    ) -> Result<LogoutOutcome, DomainError> {
        let identity = self
            .verifier
            .verify_in(tx, refresh_token, TokenKind::Refresh)
            .await?;

        if !self.revocation.revoke_one_in(tx, refresh_token).await? {
            return Err(TokenError::TokenInvalid.into());
        }

        let revoked_access_tokens = self
            .revocation
            .revoke_all_in(tx, identity.id(), TokenKind::Access)
            .await?;

        Ok(LogoutOutcome {
            user_id: identity.id(),
            revoked_access_tokens,
        })
    }
}
