//! Token service module for ledger-backed JWT management
//!
//! This module handles the whole credential lifecycle:
//! - Issuance of signed credentials with a matching ledger row
//! - The ordered verification pipeline
//! - Single and bulk revocation
//! - Atomic login, refresh rotation and logout

mod clock;
mod codec;
mod config;
mod issuer;
mod revocation;
mod rotation;
mod service;
mod verifier;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::TokenCodec;
pub use config::TokenServiceConfig;
pub use issuer::TokenIssuer;
pub use revocation::RevocationManager;
pub use rotation::{LogoutOutcome, RotationCoordinator};
pub use service::TokenService;
pub use verifier::TokenVerifier;
