//! MySQL implementation of the identity collaborators.
//!
//! Resolves token subjects from the `users` table, checks email/password
//! pairs against bcrypt hashes and stores bootstrapped accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use tk_core::domain::entities::user::User;
use tk_core::errors::DomainError;
use tk_core::repositories::{CredentialAuthenticator, IdentityResolver, UserRegistry};

use super::{decode_error, store_error};

const USER_COLUMNS: &str = "id, email, password_hash, is_active, is_admin, created_at";

/// MySQL-backed user store
#[derive(Clone)]
pub struct MySqlUserStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let id: String = row.try_get("id").map_err(|e| decode_error("id", e))?;

        Ok(User {
            id: Uuid::parse_str(&id).map_err(|e| decode_error("id", e))?,
            email: row.try_get("email").map_err(|e| decode_error("email", e))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|e| decode_error("password_hash", e))?,
            is_active: row
                .try_get("is_active")
                .map_err(|e| decode_error("is_active", e))?,
            is_admin: row
                .try_get("is_admin")
                .map_err(|e| decode_error("is_admin", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| decode_error("created_at", e))?,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER(?) LIMIT 1",
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to find user by email", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl IdentityResolver for MySqlUserStore {
    type Identity = User;

    async fn resolve(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = ? LIMIT 1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to find user by id", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl CredentialAuthenticator for MySqlUserStore {
    type Identity = User;

    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, DomainError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        // bcrypt is CPU bound
        let password = password.to_owned();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password check task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("Password hash check failed: {}", e),
            })?;

        Ok(matches.then_some(user))
    }
}

#[async_trait]
impl UserRegistry for MySqlUserStore {
    async fn create(&self, user: &User) -> Result<bool, DomainError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Ok(false);
        }

        let query = r#"
            INSERT INTO users (id, email, password_hash, is_active, is_admin, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(user.is_admin)
            .bind(user.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(true),
            // lost a race with a concurrent insert of the same email
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(false),
            Err(e) => Err(store_error("Failed to create user", e)),
        }
    }
}
