//! Command line interface
//!
//! - `serve`: run the HTTP server (default when no subcommand is given)
//! - `create-user`: bootstrap an account in the configured database

use clap::{Args, Parser, Subcommand};
use validator::Validate;

use tk_core::repositories::UserRegistry;
use tk_core::services::UserRegistration;
use tk_core::User;

use crate::dto::CreateUserRequest;
use crate::handlers::error::ApiError;

/// Tokenkeep - ledger-backed JWT sessions
#[derive(Parser, Debug)]
#[command(name = "tokenkeep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Create a user account
    CreateUser(CreateUserArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CreateUserArgs {
    /// Login email, stored lower-cased
    #[arg(long, env = "EMAIL")]
    pub email: String,

    /// Password, at least 5 characters
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Grant admin privileges
    #[arg(long)]
    pub admin: bool,
}

impl From<CreateUserArgs> for CreateUserRequest {
    fn from(args: CreateUserArgs) -> Self {
        Self {
            email: args.email.trim().to_string(),
            password: args.password,
            is_admin: args.admin,
        }
    }
}

/// Validate `args` and store the account through `registration`
pub async fn create_user<S: UserRegistry>(
    registration: &UserRegistration<S>,
    args: CreateUserArgs,
) -> Result<User, ApiError> {
    let request = CreateUserRequest::from(args);
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let user = registration
        .register(&request.email, &request.password, request.is_admin)
        .await?;
    Ok(user)
}
