//! Authentication service module
//!
//! Email/password login on top of the token service:
//! - User and admin login opening a session
//! - Refresh rotation and logout
//! - Access credential checks for protected and admin-only resources
//! - Account bootstrap with bcrypt-hashed passwords

mod registration;
mod service;

#[cfg(test)]
mod tests;

pub use registration::UserRegistration;
pub use service::{require_admin, AuthService, LoginOutcome};
