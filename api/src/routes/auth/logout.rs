use actix_web::{web, HttpRequest, HttpResponse};

use tk_core::repositories::{CredentialAuthenticator, IdentityResolver, TokenLedger};

use crate::dto::DetailResponse;
use crate::handlers::error::{ApiError, REFRESH_TOKEN_MISSING};
use crate::state::AppState;
use crate::transport::{refresh_token_from, render_logout};

/// Handler for POST /auth/logout
///
/// Blacklists the presented refresh credential and every live access
/// credential of its owner. Cookie mode also clears both cookies.
///
/// # Response
///
/// `{"detail": "Logged out"}`
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid refresh token
pub async fn logout<L, R, A>(
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

    state.auth_service.logout(&token).await?;

    Ok(render_logout(
        state.transport,
        &state.cookies,
        &DetailResponse::new("Logged out"),
    ))
}
