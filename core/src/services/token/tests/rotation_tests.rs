//! Login, refresh rotation and logout tests

use std::sync::Arc;

use crate::domain::entities::token::TokenKind;
use crate::errors::{DomainError, TokenError};
use crate::repositories::InMemoryTokenLedger;

use super::mocks::{harness, harness_on, FailingLedger};

#[tokio::test]
async fn test_rotation_invalidates_old_refresh_token() {
    let h = harness();
    let user = h.user().await;
    let r0 = h.service.login(user.id).await.unwrap();

    let rotated = h.service.refresh(r0.refresh_token()).await.unwrap();

    let err = h
        .service
        .verify(r0.refresh_token(), TokenKind::Refresh)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenInvalid)));

    let identity = h
        .service
        .verify(rotated.access_token(), TokenKind::Access)
        .await
        .unwrap();
    assert_eq!(identity.id, user.id);
    assert!(h
        .service
        .verify(rotated.refresh_token(), TokenKind::Refresh)
        .await
        .is_ok());

    // a second use of the spent token is refused
    let err = h.service.refresh(r0.refresh_token()).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenInvalid)));
}

#[tokio::test]
async fn test_refresh_with_access_token_is_refused() {
    let h = harness();
    let user = h.user().await;
    let pair = h.service.login(user.id).await.unwrap();

    let err = h.service.refresh(pair.access_token()).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Token(TokenError::WrongTokenKind { .. })
    ));
    assert_eq!(h.ledger.snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_failed_rotation_keeps_old_refresh_token() {
    let h = harness_on(FailingLedger::new(InMemoryTokenLedger::new()));
    let user = h.user().await;
    let r0 = h.service.login(user.id).await.unwrap();

    // revoke succeeds, then the refresh insert of the new pair fails
    h.ledger.fail_after_inserts(1);
    let err = h.service.refresh(r0.refresh_token()).await.unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));

    let records = h.ledger.inner().snapshot().await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.blacklisted));

    h.ledger.fail_after_inserts(i64::MAX);
    assert!(h
        .service
        .verify(r0.refresh_token(), TokenKind::Refresh)
        .await
        .is_ok());
    assert!(h.service.refresh(r0.refresh_token()).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_rotation_has_one_winner() {
    let h = Arc::new(harness());
    let user = h.user().await;
    let r0 = h.service.login(user.id).await.unwrap();
    let token = r0.refresh_token().to_string();

    let (first, second) = tokio::join!(h.service.refresh(&token), h.service.refresh(&token));

    let outcomes = [first, second];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);

    let loser = outcomes.into_iter().find_map(|r| r.err()).unwrap();
    assert!(matches!(loser, DomainError::Token(TokenError::TokenInvalid)));

    // one login pair plus exactly one rotated pair
    assert_eq!(h.ledger.snapshot().await.len(), 4);
}

#[tokio::test]
async fn test_logout_revokes_outstanding_access_tokens() {
    let h = harness();
    let user = h.user().await;

    let first = h.service.login(user.id).await.unwrap();
    let a2 = h
        .service
        .issue(user.id, TokenKind::Access, None)
        .await
        .unwrap();

    let outcome = h.service.logout(first.refresh_token()).await.unwrap();
    assert_eq!(outcome.user_id, user.id);
    assert_eq!(outcome.revoked_access_tokens, 2);

    assert!(h
        .service
        .verify(first.access_token(), TokenKind::Access)
        .await
        .is_err());
    assert!(h.service.verify(&a2.token, TokenKind::Access).await.is_err());
    assert!(h
        .service
        .verify(first.refresh_token(), TokenKind::Refresh)
        .await
        .is_err());

    // access tokens issued after the logout committed are unaffected
    let a3 = h
        .service
        .issue(user.id, TokenKind::Access, None)
        .await
        .unwrap();
    assert!(h.service.verify(&a3.token, TokenKind::Access).await.is_ok());
}

#[tokio::test]
async fn test_logout_leaves_other_refresh_tokens_alone() {
    let h = harness();
    let user = h.user().await;

    let laptop = h.service.login(user.id).await.unwrap();
    let phone = h.service.login(user.id).await.unwrap();

    h.service.logout(laptop.refresh_token()).await.unwrap();

    // every access token of the owner is gone, the other device can still refresh
    assert!(h
        .service
        .verify(phone.access_token(), TokenKind::Access)
        .await
        .is_err());
    assert!(h.service.refresh(phone.refresh_token()).await.is_ok());
}

#[tokio::test]
async fn test_logout_twice_fails() {
    let h = harness();
    let user = h.user().await;
    let pair = h.service.login(user.id).await.unwrap();

    h.service.logout(pair.refresh_token()).await.unwrap();
    let err = h.service.logout(pair.refresh_token()).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenInvalid)));
}

#[tokio::test]
async fn test_logout_racing_login_keeps_later_session() {
    let h = Arc::new(harness());
    let user = h.user().await;
    let first = h.service.login(user.id).await.unwrap();

    let (logout, login) = tokio::join!(
        h.service.logout(first.refresh_token()),
        h.service.login(user.id)
    );
    let outcome = logout.unwrap();
    let second = login.unwrap();

    // the login either committed before the revocation scan (and lost its
    // access token) or after it (and kept it); its refresh token always survives
    let access_alive = h
        .service
        .verify(second.access_token(), TokenKind::Access)
        .await
        .is_ok();
    assert_eq!(access_alive, outcome.revoked_access_tokens == 1);
    assert!(h
        .service
        .verify(second.refresh_token(), TokenKind::Refresh)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_refresh_losing_blacklist_race_is_refused() {
    let h = harness_on(FailingLedger::new(InMemoryTokenLedger::new()));
    let user = h.user().await;
    let r0 = h.service.login(user.id).await.unwrap();

    h.ledger.lose_blacklist_race(true);
    let err = h.service.refresh(r0.refresh_token()).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenInvalid)));

    // no pair was committed for the losing rotation
    let records = h.ledger.inner().snapshot().await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.blacklisted));

    h.ledger.lose_blacklist_race(false);
    assert!(h
        .service
        .verify(r0.refresh_token(), TokenKind::Refresh)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_logout_losing_blacklist_race_is_refused() {
    let h = harness_on(FailingLedger::new(InMemoryTokenLedger::new()));
    let user = h.user().await;
    let pair = h.service.login(user.id).await.unwrap();

    h.ledger.lose_blacklist_race(true);
    let err = h.service.logout(pair.refresh_token()).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenInvalid)));

    let records = h.ledger.inner().snapshot().await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.blacklisted));

    h.ledger.lose_blacklist_race(false);
    assert!(h
        .service
        .verify(pair.access_token(), TokenKind::Access)
        .await
        .is_ok());
    assert!(h
        .service
        .verify(pair.refresh_token(), TokenKind::Refresh)
        .await
        .is_ok());
}
