//! Credential issuance

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, IssuedToken, LedgerRecord, TokenKind, TokenPair};
use crate::errors::DomainError;
use crate::repositories::LedgerTransaction;

use super::clock::Clock;
use super::codec::TokenCodec;
use super::config::TokenServiceConfig;

/// Mints signed credentials and stages their ledger rows.
///
/// Nothing is committed here; the caller owns the transaction boundary.
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    config: Arc<TokenServiceConfig>,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(
        codec: Arc<TokenCodec>,
        config: Arc<TokenServiceConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            config,
            clock,
        }
    }

    /// Issue one credential for `owner_id`, using the configured lifetime for
    /// `kind` unless `ttl` overrides it
    pub async fn issue<T: LedgerTransaction>(
        &self,
        tx: &mut T,
        owner_id: Uuid,
        kind: TokenKind,
        ttl: Option<Duration>,
    ) -> Result<IssuedToken, DomainError> {
        let ttl_seconds = ttl
            .unwrap_or_else(|| self.config.ttl_for(kind))
            .num_seconds();
        if ttl_seconds <= 0 {
            return Err(DomainError::bad_request("Token lifetime must be at least one second"));
        }

        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add_signed(Duration::seconds(ttl_seconds))
            .ok_or_else(|| DomainError::bad_request("Token lifetime is out of range"))?;

        let claims = Claims::new(owner_id, kind, issued_at, expires_at);
        let token = self.codec.encode(&claims)?;

        tx.insert(LedgerRecord::new(
            owner_id,
            token.clone(),
            kind,
            issued_at,
            expires_at,
        ))
        .await?;

        tracing::debug!(user_id = %owner_id, kind = %kind, "Token staged in ledger");

        Ok(IssuedToken {
            token,
            kind,
            expires_at,
            ttl_seconds,
        })
    }

    /// Same as [`issue`](Self::issue) with the kind given by name
    pub async fn issue_named<T: LedgerTransaction>(
        &self,
        tx: &mut T,
        owner_id: Uuid,
        kind: &str,
        ttl: Option<Duration>,
    ) -> Result<IssuedToken, DomainError> {
        let kind: TokenKind = kind.parse()?;
        self.issue(tx, owner_id, kind, ttl).await
    }

    /// Access then refresh credential, staged in the same transaction
    pub async fn issue_pair<T: LedgerTransaction>(
        &self,
        tx: &mut T,
        owner_id: Uuid,
    ) -> Result<TokenPair, DomainError> {
        let access = self.issue(tx, owner_id, TokenKind::Access, None).await?;
        let refresh = self.issue(tx, owner_id, TokenKind::Refresh, None).await?;
        Ok(TokenPair { access, refresh })
    }
}
