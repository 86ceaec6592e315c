//! Shared setup for the API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{cookie::Cookie, dev::ServiceResponse, web};

use tk_api::AppState;
use tk_core::services::{AuthService, TokenService, TokenServiceConfig, TransportMode};
use tk_core::{InMemoryTokenLedger, InMemoryUserStore, User};
use tk_shared::CookieConfig;

pub const PASSWORD: &str = "correct horse battery staple";

pub type TestState = AppState<InMemoryTokenLedger, InMemoryUserStore, InMemoryUserStore>;

pub struct TestContext {
    pub state: web::Data<TestState>,
    pub ledger: Arc<InMemoryTokenLedger>,
    pub users: Arc<InMemoryUserStore>,
}

pub fn setup(transport: TransportMode) -> TestContext {
    let ledger = Arc::new(InMemoryTokenLedger::new());
    let users = Arc::new(InMemoryUserStore::new());

    let config = TokenServiceConfig::default()
        .with_secret("api-test-secret")
        .with_transport(transport);
    let token_service =
        Arc::new(TokenService::new(ledger.clone(), users.clone(), config).unwrap());
    let auth_service = Arc::new(AuthService::new(users.clone(), token_service));

    let state = web::Data::new(AppState::new(
        auth_service,
        transport,
        CookieConfig::default(),
    ));

    TestContext {
        state,
        ledger,
        users,
    }
}

impl TestContext {
    /// Register a user with [`PASSWORD`]
    pub async fn add_user(&self, email: &str, is_admin: bool) -> User {
        let hash = bcrypt::hash(PASSWORD, 4).unwrap();
        let user = User::new(email, hash).with_admin(is_admin);
        self.users.insert(user.clone()).await;
        user
    }
}

pub fn login_body(email: &str) -> serde_json::Value {
    serde_json::json!({ "email": email, "password": PASSWORD })
}

/// Owned copies of every `Set-Cookie` on a response
pub fn response_cookies<B>(resp: &ServiceResponse<B>) -> Vec<Cookie<'static>> {
    resp.response()
        .cookies()
        .map(|cookie| cookie.into_owned())
        .collect()
}

pub fn cookie_named<'a>(cookies: &'a [Cookie<'static>], name: &str) -> &'a Cookie<'static> {
    cookies
        .iter()
        .find(|cookie| cookie.name() == name)
        .unwrap_or_else(|| panic!("no cookie named {}", name))
}
