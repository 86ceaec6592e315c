//! Mapping of domain errors to HTTP responses
//!
//! Clients only learn the error category. Which verification stage rejected a
//! credential is logged, never returned.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use thiserror::Error;

use tk_core::errors::{AuthError, DomainError, ErrorCategory};
use tk_shared::{error_codes, ErrorResponse};

/// Message for any rejected credential
pub const INVALID_TOKEN: &str = "Invalid token";
/// Protected request without an access credential
pub const AUTHORIZATION_REQUIRED: &str = "Authorization required";
/// Refresh or logout without a refresh credential
pub const REFRESH_TOKEN_MISSING: &str = "Refresh token missing";
pub const ADMIN_REQUIRED: &str = "Access denied. Admin privileges required.";

/// Error type returned by every handler and the auth middleware
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// No credential where one was required
    #[error("{0}")]
    MissingCredential(&'static str),

    /// Request payload failed to parse or validate
    #[error("{0}")]
    Validation(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl ApiError {
    fn code_and_message(&self) -> (&'static str, String) {
        match self {
            ApiError::MissingCredential(message) => {
                (error_codes::UNAUTHORIZED, (*message).to_string())
            }
            ApiError::Validation(message) => (error_codes::VALIDATION_ERROR, message.clone()),
            ApiError::Domain(err) => match err {
                DomainError::Auth(AuthError::InvalidCredentials) => {
                    (error_codes::UNAUTHORIZED, err.to_string())
                }
                DomainError::Auth(AuthError::InsufficientPermissions) => {
                    (error_codes::FORBIDDEN, ADMIN_REQUIRED.to_string())
                }
                DomainError::Auth(auth) => (error_codes::FORBIDDEN, auth.to_string()),
                DomainError::BadRequest { message } => (error_codes::BAD_REQUEST, message.clone()),
                _ => match err.category() {
                    ErrorCategory::Validation => (error_codes::UNAUTHORIZED, INVALID_TOKEN.to_string()),
                    ErrorCategory::StoreUnavailable => (
                        error_codes::SERVICE_UNAVAILABLE,
                        "Service temporarily unavailable".to_string(),
                    ),
                    _ => (
                        error_codes::INTERNAL_ERROR,
                        "An internal error occurred".to_string(),
                    ),
                },
            },
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredential(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => match err.category() {
                ErrorCategory::Validation => StatusCode::UNAUTHORIZED,
                ErrorCategory::Authorization => StatusCode::FORBIDDEN,
                ErrorCategory::BadRequest => StatusCode::BAD_REQUEST,
                ErrorCategory::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCategory::Configuration | ErrorCategory::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let (code, message) = self.code_and_message();
        let mut response = HttpResponse::build(status);
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response.insert_header((header::RETRY_AFTER, "1"));
        }
        response.json(ErrorResponse::new(code, message))
    }
}
