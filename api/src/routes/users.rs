use actix_web::{web, HttpResponse};

use tk_core::repositories::{CredentialAuthenticator, IdentityResolver, TokenLedger};

use crate::dto::UserResponse;
use crate::handlers::error::ApiError;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

/// Handler for GET /me
///
/// Reloads the authenticated identity from the user store so the profile
/// reflects the account as it is now.
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token, or the account was
///   removed or disabled since the token was verified
/// - 503 Service Unavailable: User store unreachable
pub async fn me<L, R, A>(
    state: web::Data<AppState<L, R, A>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    let identity = state.auth_service.current_identity(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from_identity(&identity)))
}
