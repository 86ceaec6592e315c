//! Authentication middleware and the admin gate

mod common;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use async_trait::async_trait;
use uuid::Uuid;

use common::{login_body, setup};
use tk_api::create_app;
use tk_api::middleware::auth::{AccessVerifier, AuthContext, JwtAuth};
use tk_core::errors::{DomainError, TokenError};
use tk_core::services::TransportMode;

/// Verifier answering every token with the same result
struct StubVerifier(fn() -> Result<AuthContext, DomainError>);

#[async_trait]
impl AccessVerifier for StubVerifier {
    async fn verify_access(&self, _token: &str) -> Result<AuthContext, DomainError> {
        (self.0)()
    }
}

async fn whoami(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "user_id": auth.user_id }))
}

fn stub_auth(verify: fn() -> Result<AuthContext, DomainError>) -> JwtAuth {
    JwtAuth::new(
        Arc::new(StubVerifier(verify)),
        TransportMode::Bearer,
        "access_token",
    )
}

#[actix_web::test]
async fn test_middleware_requires_credential() {
    let app = test::init_service(
        App::new().service(
            web::resource("/whoami")
                .wrap(stub_auth(|| Err(TokenError::InvalidSignature.into())))
                .route(web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Authorization required");
}

#[actix_web::test]
async fn test_middleware_injects_auth_context() {
    let app = test::init_service(
        App::new().service(
            web::resource("/whoami")
                .wrap(stub_auth(|| {
                    Ok(AuthContext {
                        user_id: Uuid::nil(),
                        email: "stub@example.com".to_string(),
                        is_admin: false,
                    })
                }))
                .route(web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", "Bearer anything"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], Uuid::nil().to_string());
}

#[actix_web::test]
async fn test_store_outage_is_service_unavailable() {
    let app = test::init_service(
        App::new().service(
            web::resource("/whoami")
                .wrap(stub_auth(|| Err(DomainError::store("ledger down"))))
                .route(web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", "Bearer anything"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_auth_context_extractor_without_middleware() {
    let app = test::init_service(App::new().route("/whoami", web::get().to(whoami))).await;

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_token_is_not_an_access_token() {
    let ctx = setup(TransportMode::Bearer);
    ctx.add_user("ada@example.com", false).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(login_body("ada@example.com"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let refresh = body["tokens"]["refresh_token"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", format!("Bearer {}", refresh)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid token");
}

#[actix_web::test]
async fn test_deactivated_user_loses_access() {
    let ctx = setup(TransportMode::Bearer);
    let user = ctx.add_user("ada@example.com", false).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(login_body("ada@example.com"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let access = body["tokens"]["access_token"].as_str().unwrap().to_string();

    ctx.users.set_active(user.id, false).await;

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_admin_only_route() {
    let ctx = setup(TransportMode::Bearer);
    ctx.add_user("user@example.com", false).await;
    ctx.add_user("admin@example.com", true).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    for (email, expected) in [
        ("user@example.com", StatusCode::FORBIDDEN),
        ("admin@example.com", StatusCode::OK),
    ] {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(login_body(email))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let access = body["tokens"]["access_token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/admin-only")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "{}", email);

        if expected == StatusCode::FORBIDDEN {
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "Access denied. Admin privileges required.");
        }
    }
}

#[actix_web::test]
async fn test_admin_login_refuses_non_admin() {
    let ctx = setup(TransportMode::Bearer);
    ctx.add_user("user@example.com", false).await;
    ctx.add_user("admin@example.com", true).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/admin/login")
        .set_json(login_body("user@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Admin access only");

    // refused admin logins open no session
    assert!(ctx.ledger.snapshot().await.is_empty());

    let req = test::TestRequest::post()
        .uri("/auth/admin/login")
        .set_json(login_body("admin@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_failures() {
    let ctx = setup(TransportMode::Bearer);
    let inactive = ctx.add_user("gone@example.com", false).await;
    ctx.users.set_active(inactive.id, false).await;
    ctx.add_user("ada@example.com", false).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(serde_json::json!({"email": "ada@example.com", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid email or password");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(login_body("gone@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(serde_json::json!({"email": "not-an-email", "password": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health() {
    let ctx = setup(TransportMode::Cookie);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}
