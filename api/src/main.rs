use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use clap::Parser;

use tk_api::cli::{self, Cli, Command, CreateUserArgs};
use tk_api::{create_app, telemetry, AppState};
use tk_core::services::{
    ensure_transport_agreement, AuthService, TokenService, TokenServiceConfig, UserRegistration,
};
use tk_infra::{ensure_schema, DatabasePool, MySqlTokenLedger, MySqlUserStore};
use tk_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let command = Cli::parse().command();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging);

    // Everything below must hold before the first request is served
    config.validate().context("Invalid configuration")?;

    match command {
        Command::Serve => serve(config).await,
        Command::CreateUser(args) => create_user(config, args).await,
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<DatabasePool> {
    let pool = DatabasePool::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    if config.database.ensure_schema {
        ensure_schema(pool.get_pool()).await?;
    }
    Ok(pool)
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(environment = %config.environment, "Starting Tokenkeep API server");

    let token_config = TokenServiceConfig::from_auth_config(&config.auth)?;
    ensure_transport_agreement(token_config.transport, config.server.transport)?;

    let pool = connect(&config).await?;

    let ledger = Arc::new(MySqlTokenLedger::new(pool.get_pool().clone()));
    let users = Arc::new(MySqlUserStore::new(pool.get_pool().clone()));
    let token_service = Arc::new(TokenService::new(ledger, users.clone(), token_config)?);
    let auth_service = Arc::new(AuthService::new(users, token_service));

    let state = web::Data::new(AppState::new(
        auth_service,
        config.server.transport,
        config.auth.cookie.clone(),
    )
    .with_max_payload_size(config.server.max_payload_size));

    let bind_address = config.server.bind_address();
    tracing::info!(
        address = %bind_address,
        transport = %config.server.transport,
        "Server will bind"
    );

    let mut server = HttpServer::new(move || create_app(state.clone()))
        .keep_alive(std::time::Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn create_user(config: AppConfig, args: CreateUserArgs) -> anyhow::Result<()> {
    let pool = connect(&config).await?;

    let registration =
        UserRegistration::new(Arc::new(MySqlUserStore::new(pool.get_pool().clone())));
    let result = cli::create_user(&registration, args).await;
    pool.close().await;

    let user = result.context("Failed to create user")?;
    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        is_admin = user.is_admin,
        "User creation completed"
    );
    Ok(())
}
