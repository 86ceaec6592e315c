//! Account bootstrap

use std::sync::Arc;

use crate::domain::entities::user::User;
use crate::errors::DomainError;
use crate::repositories::UserRegistry;

/// Creates accounts with bcrypt-hashed passwords
pub struct UserRegistration<S: UserRegistry> {
    registry: Arc<S>,
    cost: u32,
}

impl<S: UserRegistry> UserRegistration<S> {
    pub fn new(registry: Arc<S>) -> Self {
        Self {
            registry,
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Store an active account. The email is trimmed and lower-cased first.
    ///
    /// # Errors
    /// * `DomainError::BadRequest` - Empty email or password, or email already registered
    /// * `DomainError::StoreUnavailable` - Registry failure
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, DomainError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::bad_request("Email and password are required"));
        }

        let password = password.to_owned();
        let cost = self.cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password hashing task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("Password hashing failed: {}", e),
            })?;

        let user = User::new(email, password_hash).with_admin(is_admin);
        if !self.registry.create(&user).await? {
            tracing::warn!(email = %user.email, "User already exists");
            return Err(DomainError::bad_request("Email already registered"));
        }

        tracing::info!(user_id = %user.id, is_admin, "User created");
        Ok(user)
    }
}
