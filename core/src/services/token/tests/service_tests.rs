//! Token service construction and self-committing entry points

use chrono::Duration;
use std::sync::Arc;

use tk_shared::AuthConfig;

use crate::domain::entities::token::TokenKind;
use crate::errors::{DomainError, ErrorCategory};
use crate::repositories::{InMemoryTokenLedger, InMemoryUserStore};
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::services::TransportMode;

use super::mocks::{harness, test_config};

fn build(config: TokenServiceConfig) -> Result<(), DomainError> {
    TokenService::new(
        Arc::new(InMemoryTokenLedger::new()),
        Arc::new(InMemoryUserStore::new()),
        config,
    )
    .map(|_| ())
}

#[test]
fn test_construction_validates_config() {
    assert!(build(test_config()).is_ok());

    let inverted = TokenServiceConfig {
        access_ttl: Duration::days(2),
        ..test_config()
    };
    let err = build(inverted).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);

    let no_secret = test_config().with_secret("");
    assert_eq!(
        build(no_secret).unwrap_err().category(),
        ErrorCategory::Configuration
    );
}

#[test]
fn test_config_from_auth_section() {
    let mut auth = AuthConfig::default();
    auth.jwt.secret = "from-config".to_string();
    auth.jwt.access_token_expiry_minutes = 15;
    auth.transport = TransportMode::Bearer;

    let config = TokenServiceConfig::from_auth_config(&auth).unwrap();
    assert_eq!(config.access_ttl, Duration::minutes(15));
    assert_eq!(config.refresh_ttl, Duration::days(1));
    assert_eq!(config.transport, TransportMode::Bearer);

    auth.jwt.algorithm = "RS256".to_string();
    let err = TokenServiceConfig::from_auth_config(&auth).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[tokio::test]
async fn test_login_commits_one_pair() {
    let h = harness();
    let user = h.user().await;

    let pair = h.service.login(user.id).await.unwrap();
    assert_eq!(pair.access.ttl_seconds, 1800);
    assert_eq!(pair.refresh.ttl_seconds, 86_400);

    let records = h.ledger.snapshot().await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.owner_id == user.id && !r.blacklisted));

    h.service
        .verify(pair.access_token(), TokenKind::Access)
        .await
        .unwrap();
    h.service
        .verify(pair.refresh_token(), TokenKind::Refresh)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_self_committing_revocation() {
    let h = harness();
    let user = h.user().await;
    let pair = h.service.login(user.id).await.unwrap();

    assert!(h.service.revocation().revoke_one(pair.access_token()).await.unwrap());
    assert!(h.ledger.record(pair.access_token()).await.unwrap().blacklisted);

    let count = h
        .service
        .revocation()
        .revoke_all(user.id, TokenKind::Refresh)
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert!(h.ledger.record(pair.refresh_token()).await.unwrap().blacklisted);
}
