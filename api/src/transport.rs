//! Rendering issued credentials onto HTTP responses

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    http::header::{self, ContentType},
    HttpRequest, HttpResponse,
};
use serde::Serialize;

use tk_core::domain::entities::token::TokenPair;
use tk_core::errors::DomainError;
use tk_core::services::transport::{clear_directives, merge_into_body};
use tk_core::services::{CookieDirective, CredentialRendering, TransportMode};
use tk_shared::CookieConfig;

use crate::dto::RefreshTokenRequest;
use crate::handlers::error::ApiError;

/// 200 response carrying `body` and the credentials of `pair`
pub fn render_pair<T: Serialize>(
    mode: TransportMode,
    cookies: &CookieConfig,
    pair: &TokenPair,
    body: &T,
) -> Result<HttpResponse, ApiError> {
    let bytes = serde_json::to_vec(body).map_err(|e| DomainError::Internal {
        message: format!("Failed to serialize response body: {}", e),
    })?;

    match CredentialRendering::for_pair(mode, pair, cookies) {
        CredentialRendering::Cookies(directives) => {
            let mut response = HttpResponse::Ok();
            for directive in &directives {
                response.cookie(to_cookie(directive));
            }
            Ok(response.content_type(ContentType::json()).body(bytes))
        }
        CredentialRendering::Body(tokens) => {
            let merged = merge_into_body(&bytes, &tokens)?;
            Ok(HttpResponse::Ok()
                .content_type(ContentType::json())
                .insert_header((header::CONTENT_LENGTH, merged.len()))
                .body(merged))
        }
    }
}

/// 200 response that also removes the auth cookies in cookie mode
pub fn render_logout<T: Serialize>(
    mode: TransportMode,
    cookies: &CookieConfig,
    body: &T,
) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    if mode == TransportMode::Cookie {
        for directive in clear_directives(cookies) {
            response.cookie(to_cookie(&directive));
        }
    }
    response.json(body)
}

/// Refresh credential as carried by the active transport
pub fn refresh_token_from(
    req: &HttpRequest,
    body: &[u8],
    mode: TransportMode,
    cookies: &CookieConfig,
) -> Option<String> {
    match mode {
        TransportMode::Cookie => req
            .cookie(&cookies.refresh_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty()),
        TransportMode::Bearer => RefreshTokenRequest::from_body(body).token(),
    }
}

fn to_cookie(directive: &CookieDirective) -> Cookie<'static> {
    let mut builder = Cookie::build(directive.name.clone(), directive.value.clone())
        .path(directive.path.clone())
        .http_only(true)
        .secure(directive.secure)
        .same_site(same_site(&directive.same_site))
        .max_age(CookieDuration::seconds(directive.max_age_seconds));

    if let Some(domain) = &directive.domain {
        builder = builder.domain(domain.clone());
    }

    builder.finish()
}

fn same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}
