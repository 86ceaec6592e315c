use actix_web::{web, HttpRequest, HttpResponse};

use tk_core::repositories::{CredentialAuthenticator, IdentityResolver, TokenLedger};

use crate::dto::DetailResponse;
use crate::handlers::error::{ApiError, REFRESH_TOKEN_MISSING};
use crate::state::AppState;
use crate::transport::{refresh_token_from, render_pair};

/// Handler for POST /auth/refresh
///
/// Rotates the refresh credential: the presented one is blacklisted and a new
/// pair is rendered with `{"detail": "Tokens refreshed"}`.
///
/// The refresh credential comes from the refresh cookie in cookie mode and
/// from the `refresh_token` body field in bearer mode.
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid, expired or already rotated token
/// - 503 Service Unavailable: Ledger unreachable, nothing changed
pub async fn refresh<L, R, A>(
    req: HttpRequest,
    state: web::Data<AppState<L, R, A>>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    let token = refresh_token_from(&req, &body, state.transport, &state.cookies)
        .ok_or(ApiError::MissingCredential(REFRESH_TOKEN_MISSING))?;

    let pair = state.auth_service.refresh(&token).await?;

    render_pair(
        state.transport,
        &state.cookies,
        &pair,
        &DetailResponse::new("Tokens refreshed"),
    )
}
