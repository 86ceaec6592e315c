//! In-memory user store for tests and local runs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

use super::r#trait::{CredentialAuthenticator, IdentityResolver, UserRegistry};

/// User store keyed by id, checking passwords with bcrypt
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Toggle `is_active`; returns false if the user does not exist
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> bool {
        match self.users.write().await.get_mut(&id) {
            Some(user) => {
                user.is_active = is_active;
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: Uuid) -> Option<User> {
        self.users.write().await.remove(&id)
    }
}

#[async_trait]
impl IdentityResolver for InMemoryUserStore {
    type Identity = User;

    async fn resolve(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl CredentialAuthenticator for InMemoryUserStore {
    type Identity = User;

    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, DomainError> {
        let user = self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();

        let Some(user) = user else {
            return Ok(None);
        };

        let matches = bcrypt::verify(password, &user.password_hash).map_err(|e| {
            DomainError::Internal {
                message: format!("Password hash check failed: {}", e),
            }
        })?;

        Ok(matches.then_some(user))
    }
}

#[async_trait]
impl UserRegistry for InMemoryUserStore {
    async fn create(&self, user: &User) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Ok(false);
        }
        users.insert(user.id, user.clone());
        Ok(true)
    }
}
