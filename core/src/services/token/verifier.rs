//! Credential verification pipeline

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::token::{Claims, LedgerRecord, TokenKind, VerificationStage};
use crate::domain::entities::user::Identity;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{IdentityResolver, LedgerTransaction, TokenLedger};

use super::clock::Clock;
use super::codec::TokenCodec;

/// What earlier stages hand to later ones
#[derive(Default)]
struct Progress {
    claims: Option<Claims>,
    owner_id: Option<Uuid>,
    record: Option<LedgerRecord>,
}

/// Turns a raw credential into an authenticated identity.
///
/// Runs the stages of [`VerificationStage::PIPELINE`] in order and stops at
/// the first failure. The pure stages (signature, kind, subject) finish before
/// any store is touched, including opening a transaction.
pub struct TokenVerifier<L: TokenLedger, R: IdentityResolver> {
    ledger: Arc<L>,
    resolver: Arc<R>,
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl<L: TokenLedger, R: IdentityResolver> TokenVerifier<L, R> {
    pub fn new(
        ledger: Arc<L>,
        resolver: Arc<R>,
        codec: Arc<TokenCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            resolver,
            codec,
            clock,
        }
    }

    /// Verify in a transaction of its own
    pub async fn verify(&self, token: &str, expected: TokenKind) -> Result<R::Identity, DomainError> {
        let progress = self
            .run_pure_stages(token, expected)
            .map_err(|e| log_rejection(e.into(), expected))?;

        let mut tx = self
            .ledger
            .begin()
            .await
            .map_err(|e| log_rejection(e, expected))?;
        let result = self
            .run_store_stages(&mut tx, token, expected, progress)
            .await;

        // read-only, nothing to keep
        if let Err(e) = tx.rollback().await {
            tracing::warn!(error = %e, "Failed to close verification transaction");
        }

        result.map_err(|e| log_rejection(e, expected))
    }

    /// Verify inside a caller-owned transaction
    pub async fn verify_in(
        &self,
        tx: &mut L::Transaction,
        token: &str,
        expected: TokenKind,
    ) -> Result<R::Identity, DomainError> {
        let progress = self
            .run_pure_stages(token, expected)
            .map_err(|e| log_rejection(e.into(), expected))?;

        self.run_store_stages(tx, token, expected, progress)
            .await
            .map_err(|e| log_rejection(e, expected))
    }

    fn run_pure_stages(&self, token: &str, expected: TokenKind) -> Result<Progress, TokenError> {
        let mut progress = Progress::default();

        for stage in VerificationStage::PIPELINE
            .into_iter()
            .filter(VerificationStage::is_pure)
        {
            match stage {
                VerificationStage::Signature => {
                    progress.claims = Some(self.codec.decode(token)?);
                }
                VerificationStage::Kind => {
                    check_kind(progress.claims.as_ref(), expected)?;
                }
                VerificationStage::Subject => {
                    progress.owner_id = Some(check_subject(progress.claims.as_ref())?);
                }
                _ => {}
            }
        }

        Ok(progress)
    }

    async fn run_store_stages(
        &self,
        tx: &mut L::Transaction,
        token: &str,
        expected: TokenKind,
        mut progress: Progress,
    ) -> Result<R::Identity, DomainError> {
        for stage in VerificationStage::PIPELINE
            .into_iter()
            .filter(|stage| !stage.is_pure())
        {
            match stage {
                VerificationStage::LedgerLookup => {
                    let record = tx
                        .find(token, expected)
                        .await?
                        .ok_or(TokenError::UnknownToken)?;
                    progress.record = Some(record);
                }
                VerificationStage::LedgerValidity => {
                    self.check_validity(progress.record.as_ref())?;
                }
                VerificationStage::Identity => {
                    let owner_id = progress.owner_id.ok_or(TokenError::MalformedToken)?;
                    return self.resolve_identity(owner_id).await;
                }
                _ => {}
            }
        }

        Err(DomainError::Internal {
            message: "Verification pipeline ended without an identity".to_string(),
        })
    }

    fn check_validity(&self, record: Option<&LedgerRecord>) -> Result<(), TokenError> {
        match record {
            Some(record) if record.is_usable_at(self.clock.now()) => Ok(()),
            Some(_) => Err(TokenError::TokenInvalid),
            None => Err(TokenError::UnknownToken),
        }
    }

    /// The identity stage on its own: resolve `owner_id` and require it active
    pub async fn resolve_identity(&self, owner_id: Uuid) -> Result<R::Identity, DomainError> {
        let identity = self
            .resolver
            .resolve(owner_id)
            .await?
            .ok_or(TokenError::UnknownIdentity)?;

        if !identity.is_active() {
            return Err(TokenError::IdentityInactive.into());
        }

        Ok(identity)
    }
}

fn check_kind(claims: Option<&Claims>, expected: TokenKind) -> Result<(), TokenError> {
    match claims {
        Some(claims) if claims.is_kind(expected) => Ok(()),
        _ => Err(TokenError::WrongTokenKind { expected }),
    }
}

fn check_subject(claims: Option<&Claims>) -> Result<Uuid, TokenError> {
    claims
        .and_then(Claims::user_id)
        .ok_or(TokenError::MalformedToken)
}

fn log_rejection(err: DomainError, expected: TokenKind) -> DomainError {
    match err.as_token_error().and_then(TokenError::stage) {
        Some(stage) => tracing::warn!(stage = %stage, expected = %expected, "Token rejected"),
        None => tracing::error!(error = %err, "Token verification failed"),
    }
    err
}
