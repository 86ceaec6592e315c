//! Access credential authentication middleware.
//!
//! Extracts the access credential the way the active transport carries it
//! (cookie or `Authorization: Bearer`), verifies it through an
//! [`AccessVerifier`] and injects an [`AuthContext`] into the request.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use tk_core::domain::entities::user::Identity;
use tk_core::errors::DomainError;
use tk_core::repositories::{CredentialAuthenticator, IdentityResolver, TokenLedger};
use tk_core::services::{require_admin, AuthService, TransportMode};

use crate::handlers::error::{ApiError, AUTHORIZATION_REQUIRED};

/// Identity of an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn from_identity<I: Identity>(identity: &I) -> Self {
        Self {
            user_id: identity.id(),
            email: identity.email().to_owned(),
            is_admin: identity.is_admin(),
        }
    }
}

// Only verified identities become an AuthContext, and the verifier rejects
// inactive ones.
impl Identity for AuthContext {
    fn id(&self) -> Uuid {
        self.user_id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn is_active(&self) -> bool {
        true
    }

    fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// Object-safe access verification so the middleware stays non-generic
#[async_trait]
pub trait AccessVerifier: Send + Sync {
    async fn verify_access(&self, token: &str) -> Result<AuthContext, DomainError>;
}

#[async_trait]
impl<L, R, A> AccessVerifier for AuthService<L, R, A>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    async fn verify_access(&self, token: &str) -> Result<AuthContext, DomainError> {
        let identity = self.authenticate_access(token).await?;
        Ok(AuthContext::from_identity(&identity))
    }
}

/// Authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    verifier: Arc<dyn AccessVerifier>,
    transport: TransportMode,
    /// Name of the access cookie in cookie mode
    cookie_name: String,
}

impl JwtAuth {
    pub fn new(
        verifier: Arc<dyn AccessVerifier>,
        transport: TransportMode,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            transport,
            cookie_name: cookie_name.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            auth: self.clone(),
        }))
    }
}

/// Authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    auth: JwtAuth,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let token = extract_access_token(&req, self.auth.transport, &self.auth.cookie_name);
        let verifier = Arc::clone(&self.auth.verifier);

        Box::pin(async move {
            let Some(token) = token else {
                return Ok(reject(req, ApiError::MissingCredential(AUTHORIZATION_REQUIRED)));
            };

            match verifier.verify_access(&token).await {
                Ok(context) => {
                    req.extensions_mut().insert(context);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(e) => Ok(reject(req, ApiError::from(e))),
            }
        })
    }
}

/// Answer the request with the error instead of calling the inner service
fn reject<B>(req: ServiceRequest, err: ApiError) -> ServiceResponse<EitherBody<B>> {
    let response = err.error_response();
    req.into_response(response).map_into_right_body()
}

/// Access credential as carried by the active transport
fn extract_access_token(
    req: &ServiceRequest,
    transport: TransportMode,
    cookie_name: &str,
) -> Option<String> {
    match transport {
        TransportMode::Cookie => req
            .cookie(cookie_name)
            .map(|cookie| cookie.value().to_string()),
        TransportMode::Bearer => extract_bearer_token(req),
    }
    .filter(|token| !token.is_empty())
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result: Result<Self, Self::Error> = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::MissingCredential(AUTHORIZATION_REQUIRED).into());

        ready(result)
    }
}

/// Extractor for routes restricted to admins
#[derive(Debug, Clone)]
pub struct AdminContext(pub AuthContext);

impl FromRequest for AdminContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result: Result<Self, Self::Error> = match req.extensions().get::<AuthContext>() {
            Some(context) => require_admin(context)
                .map(|()| AdminContext(context.clone()))
                .map_err(|e| {
                    tracing::warn!(user_id = %context.user_id, "Admin route refused");
                    ApiError::from(e).into()
                }),
            None => Err(ApiError::MissingCredential(AUTHORIZATION_REQUIRED).into()),
        };

        ready(result)
    }
}
