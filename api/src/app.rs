//! Application factory

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use tk_core::repositories::{CredentialAuthenticator, IdentityResolver, TokenLedger};
use tk_shared::ErrorResponse;

use crate::handlers::error::ApiError;
use crate::routes::{auth, health::health_check, protected, users};
use crate::state::AppState;

/// Create and configure the application around `state`
pub fn create_app<L, R, A>(
    state: web::Data<AppState<L, R, A>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    L: TokenLedger,
    R: IdentityResolver,
    A: CredentialAuthenticator,
{
    let jwt_auth = state.jwt_auth();
    let max_payload_size = state.max_payload_size;

    App::new()
        .app_data(state)
        .app_data(web::PayloadConfig::new(max_payload_size))
        .app_data(
            web::JsonConfig::default()
                .limit(max_payload_size)
                .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
        )
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/auth")
                .route("/login", web::post().to(auth::login::<L, R, A>))
                .route("/admin/login", web::post().to(auth::admin_login::<L, R, A>))
                .route("/refresh", web::post().to(auth::refresh::<L, R, A>))
                .route("/logout", web::post().to(auth::logout::<L, R, A>)),
        )
        .service(
            web::resource("/protected")
                .wrap(jwt_auth.clone())
                .route(web::get().to(protected::protected)),
        )
        .service(
            web::resource("/me")
                .wrap(jwt_auth.clone())
                .route(web::get().to(users::me::<L, R, A>)),
        )
        .service(
            web::resource("/admin-only")
                .wrap(jwt_auth)
                .route(web::get().to(protected::admin_only)),
        )
        .default_service(web::route().to(|| async {
            HttpResponse::NotFound().json(ErrorResponse::new(
                "NOT_FOUND",
                "The requested resource was not found",
            ))
        }))
}

