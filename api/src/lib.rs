//! # Tokenkeep API
//!
//! actix-web surface over the token engine: login, admin login, refresh,
//! logout, and routes guarded by the access-credential middleware. The
//! `create-user` command bootstraps accounts.

pub mod app;
pub mod cli;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod transport;

pub use app::create_app;
pub use state::AppState;
