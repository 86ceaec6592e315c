//! Issuance tests

use chrono::Duration;
use std::collections::HashSet;

use crate::domain::entities::token::TokenKind;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{InMemoryTokenLedger, LedgerTransaction, TokenLedger};
use crate::services::token::TokenCodec;

use super::mocks::{harness, harness_on, t0, test_config, FailingLedger};

#[tokio::test]
async fn test_verify_after_issue_returns_owner() {
    let h = harness();
    let user = h.user().await;

    for kind in [TokenKind::Access, TokenKind::Refresh] {
        let issued = h.service.issue(user.id, kind, None).await.unwrap();
        let identity = h.service.verify(&issued.token, kind).await.unwrap();
        assert_eq!(identity.id, user.id);
    }
}

#[tokio::test]
async fn test_ledger_record_matches_claims() {
    let h = harness();
    let user = h.user().await;

    let issued = h
        .service
        .issue(user.id, TokenKind::Access, None)
        .await
        .unwrap();
    let record = h.ledger.record(&issued.token).await.unwrap();
    let claims = TokenCodec::new(&test_config()).decode(&issued.token).unwrap();

    assert_eq!(record.owner_id, user.id);
    assert_eq!(record.kind, TokenKind::Access);
    assert!(!record.blacklisted);
    assert_eq!(record.created_at, t0());
    assert_eq!(record.created_at.timestamp(), claims.iat);
    assert_eq!(record.expires_at.timestamp(), claims.exp);
    assert_eq!(record.expires_at, t0() + Duration::minutes(30));
    assert_eq!(issued.ttl_seconds, 1800);
    assert_eq!(claims.token_type.as_deref(), Some("access"));
}

#[tokio::test]
async fn test_ttl_override() {
    let h = harness();
    let user = h.user().await;

    let issued = h
        .service
        .issue(user.id, TokenKind::Access, Some(Duration::minutes(5)))
        .await
        .unwrap();
    assert_eq!(issued.ttl_seconds, 300);
    assert_eq!(issued.expires_at, t0() + Duration::minutes(5));
}

#[tokio::test]
async fn test_non_positive_ttl_is_refused() {
    let h = harness();
    let user = h.user().await;

    for ttl in [
        Duration::milliseconds(500),
        Duration::zero(),
        Duration::minutes(-5),
    ] {
        let err = h
            .service
            .issue(user.id, TokenKind::Access, Some(ttl))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest { .. }), "ttl {ttl}");
    }

    assert!(h.ledger.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_out_of_range_ttl_is_refused() {
    let h = harness();
    let user = h.user().await;

    let err = h
        .service
        .issue(user.id, TokenKind::Refresh, Some(Duration::weeks(20_000_000)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest { .. }));
    assert!(h.ledger.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_one_second_ttl_outlives_creation() {
    let h = harness();
    let user = h.user().await;

    let issued = h
        .service
        .issue(user.id, TokenKind::Access, Some(Duration::milliseconds(1500)))
        .await
        .unwrap();
    let record = h.ledger.record(&issued.token).await.unwrap();

    assert_eq!(issued.ttl_seconds, 1);
    assert!(record.expires_at > record.created_at);
}

#[tokio::test]
async fn test_same_instant_tokens_are_distinct() {
    let h = harness();
    let user = h.user().await;
    let codec = TokenCodec::new(&test_config());

    let mut tokens = HashSet::new();
    let mut nonces = HashSet::new();
    for _ in 0..20 {
        let issued = h
            .service
            .issue(user.id, TokenKind::Access, None)
            .await
            .unwrap();
        nonces.insert(codec.decode(&issued.token).unwrap().jti);
        tokens.insert(issued.token);
    }

    assert_eq!(tokens.len(), 20);
    assert_eq!(nonces.len(), 20);
    assert_eq!(h.ledger.snapshot().await.len(), 20);
}

#[tokio::test]
async fn test_unknown_kind_name_is_bad_request() {
    let h = harness();
    let user = h.user().await;

    let mut tx = h.ledger.begin().await.unwrap();
    let result = h
        .service
        .issuer()
        .issue_named(&mut tx, user.id, "session", None)
        .await;
    assert!(matches!(result, Err(DomainError::BadRequest { .. })));

    let issued = h
        .service
        .issuer()
        .issue_named(&mut tx, user.id, "refresh", None)
        .await
        .unwrap();
    assert_eq!(issued.kind, TokenKind::Refresh);
    tx.commit().await.unwrap();

    assert_eq!(h.ledger.snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_staged_pair_is_invisible_until_commit() {
    let h = harness();
    let user = h.user().await;

    let mut tx = h.ledger.begin().await.unwrap();
    let pair = h.service.issuer().issue_pair(&mut tx, user.id).await.unwrap();
    tx.rollback().await.unwrap();

    let err = h
        .service
        .verify(pair.access_token(), TokenKind::Access)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::UnknownToken)));
    assert!(h.ledger.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_pair_is_committed_together() {
    let h = harness();
    let user = h.user().await;

    let pair = h.service.login(user.id).await.unwrap();
    assert_eq!(pair.access.ttl_seconds, 1800);
    assert_eq!(pair.refresh.ttl_seconds, 86_400);

    let records = h.ledger.snapshot().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, TokenKind::Access);
    assert_eq!(records[1].kind, TokenKind::Refresh);
}

#[tokio::test]
async fn test_ledger_failure_is_store_unavailable() {
    let h = harness_on(FailingLedger::new(InMemoryTokenLedger::new()));
    let user = h.user().await;
    h.ledger.fail_after_inserts(1);

    let err = h.service.login(user.id).await.unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));
    assert!(err.is_retryable());

    // the access token staged before the failure was rolled back with it
    assert!(h.ledger.inner().snapshot().await.is_empty());
}
