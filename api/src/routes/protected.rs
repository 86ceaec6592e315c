//! Routes behind the authentication middleware

use actix_web::HttpResponse;

use crate::dto::AccessGrantedResponse;
use crate::middleware::auth::{AdminContext, AuthContext};

/// Handler for GET /protected
pub async fn protected(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(AccessGrantedResponse {
        detail: "Access granted".to_string(),
        user_id: auth.user_id,
    })
}

/// Handler for GET /admin-only
pub async fn admin_only(AdminContext(auth): AdminContext) -> HttpResponse {
    HttpResponse::Ok().json(AccessGrantedResponse {
        detail: "Admin access granted".to_string(),
        user_id: auth.user_id,
    })
}
