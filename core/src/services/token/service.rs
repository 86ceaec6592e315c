//! Token service wiring issuer, verifier, revocation and rotation together

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::domain::entities::token::{IssuedToken, TokenKind, TokenPair};
use crate::errors::DomainError;
use crate::repositories::{IdentityResolver, LedgerTransaction, TokenLedger};

use super::clock::{Clock, SystemClock};
use super::codec::TokenCodec;
use super::config::TokenServiceConfig;
use super::issuer::TokenIssuer;
use super::revocation::{rollback_quietly, RevocationManager};
use super::rotation::{LogoutOutcome, RotationCoordinator};
use super::verifier::TokenVerifier;

/// Entry point to the token lifecycle.
///
/// The ledger and identity resolver are injected here and shared by every
/// component; nothing is registered globally.
pub struct TokenService<L: TokenLedger, R: IdentityResolver> {
    config: Arc<TokenServiceConfig>,
    ledger: Arc<L>,
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier<L, R>>,
    revocation: Arc<RevocationManager<L>>,
    rotation: RotationCoordinator<L, R>,
}

impl<L: TokenLedger, R: IdentityResolver> TokenService<L, R> {
    /// Creates a token service on the wall clock
    pub fn new(
        ledger: Arc<L>,
        resolver: Arc<R>,
        config: TokenServiceConfig,
    ) -> Result<Self, DomainError> {
        Self::with_clock(ledger, resolver, config, Arc::new(SystemClock))
    }

    /// Creates a token service reading time from `clock`
    pub fn with_clock(
        ledger: Arc<L>,
        resolver: Arc<R>,
        config: TokenServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let config = Arc::new(config);
        let codec = Arc::new(TokenCodec::new(&config));
        let issuer = Arc::new(TokenIssuer::new(
            codec.clone(),
            config.clone(),
            clock.clone(),
        ));
        let verifier = Arc::new(TokenVerifier::new(
            ledger.clone(),
            resolver,
            codec,
            clock.clone(),
        ));
        let revocation = Arc::new(RevocationManager::new(ledger.clone(), clock));
        let rotation = RotationCoordinator::new(
            ledger.clone(),
            verifier.clone(),
            revocation.clone(),
            issuer.clone(),
        );

        Ok(Self {
            config,
            ledger,
            issuer,
            verifier,
            revocation,
            rotation,
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn verifier(&self) -> &TokenVerifier<L, R> {
        &self.verifier
    }

    pub fn revocation(&self) -> &RevocationManager<L> {
        &self.revocation
    }

    pub fn rotation(&self) -> &RotationCoordinator<L, R> {
        &self.rotation
    }

    /// Issue and commit a single credential
    pub async fn issue(
        &self,
        owner_id: Uuid,
        kind: TokenKind,
        ttl: Option<Duration>,
    ) -> Result<IssuedToken, DomainError> {
        let mut tx = self.ledger.begin().await?;
        match self.issuer.issue(&mut tx, owner_id, kind, ttl).await {
            Ok(issued) => {
                tx.commit().await?;
                Ok(issued)
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    pub async fn verify(&self, token: &str, kind: TokenKind) -> Result<R::Identity, DomainError> {
        self.verifier.verify(token, kind).await
    }

    pub async fn login(&self, owner_id: Uuid) -> Result<TokenPair, DomainError> {
        self.rotation.login(owner_id).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        self.rotation.refresh(refresh_token).await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<LogoutOutcome, DomainError> {
        self.rotation.logout(refresh_token).await
    }
}
