use actix_web::{web, HttpResponse};
use validator::Validate;

use tk_core::repositories::{CredentialAuthenticator, IdentityResolver, TokenLedger};

use crate::dto::{DetailResponse, LoginRequest};
use crate::handlers::error::ApiError;
use crate::state::AppState;
use crate::transport::render_pair;

/// Handler for POST /auth/login
///
/// # Request Body
///
/// ```json
/// { "email": "ada@example.com", "password": "..." }
/// ```
///
/// # Response
///
/// `{"detail": "Login successful"}`, with the new credentials as cookies or
/// merged into the body under `tokens`.
///
/// ## Errors
/// - 400 Bad Request: Invalid payload
/// - 401 Unauthorized: Unknown email or wrong password
/// - 403 Forbidden: Account inactive
pub async fn login<L, R, A>(
    state: web::Data<AppState<L, R, A>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let outcome = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    render_pair(
        state.transport,
        &state.cookies,
        &outcome.tokens,
        &DetailResponse::new("Login successful"),
    )
}

/// Handler for POST /auth/admin/login
///
/// Same as [`login`], plus 403 "Admin access only" for valid credentials of a
/// non-admin account. No session is opened in that case.
pub async fn admin_login<L, R, A>(
    state: web::Data<AppState<L, R, A>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let outcome = state
        .auth_service
        .admin_login(&request.email, &request.password)
        .await?;

    render_pair(
        state.transport,
        &state.cookies,
        &outcome.tokens,
        &DetailResponse::new("Login successful"),
    )
}
