//! Blacklist-based revocation

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::token::TokenKind;
use crate::errors::DomainError;
use crate::repositories::{LedgerTransaction, TokenLedger};

use super::clock::Clock;

/// Single-token and bulk blacklisting. Unknown targets are never an error.
pub struct RevocationManager<L: TokenLedger> {
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L: TokenLedger> RevocationManager<L> {
    pub fn new(ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    /// Blacklist one credential and commit. Returns whether this call flipped it.
    pub async fn revoke_one(&self, token: &str) -> Result<bool, DomainError> {
        let mut tx = self.ledger.begin().await?;
        match self.revoke_one_in(&mut tx, token).await {
            Ok(flipped) => {
                tx.commit().await?;
                Ok(flipped)
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    pub async fn revoke_one_in(
        &self,
        tx: &mut L::Transaction,
        token: &str,
    ) -> Result<bool, DomainError> {
        let flipped = tx.blacklist(token).await?;
        tracing::debug!(flipped, "Single token revocation");
        Ok(flipped)
    }

    /// Blacklist every live credential of `owner_id` and `kind` and commit
    pub async fn revoke_all(&self, owner_id: Uuid, kind: TokenKind) -> Result<u64, DomainError> {
        let mut tx = self.ledger.begin().await?;
        match self.revoke_all_in(&mut tx, owner_id, kind).await {
            Ok(count) => {
                tx.commit().await?;
                Ok(count)
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    pub async fn revoke_all_in(
        &self,
        tx: &mut L::Transaction,
        owner_id: Uuid,
        kind: TokenKind,
    ) -> Result<u64, DomainError> {
        let count = tx.blacklist_owner(owner_id, kind, self.clock.now()).await?;
        tracing::info!(user_id = %owner_id, kind = %kind, count, "Revoked tokens for user");
        Ok(count)
    }
}

pub(crate) async fn rollback_quietly<T: LedgerTransaction>(tx: T) {
    if let Err(e) = tx.rollback().await {
        tracing::error!(error = %e, "Ledger rollback failed");
    }
}
