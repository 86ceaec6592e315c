//! Schema bootstrap
//!
//! Creates the `users` and `jwt_tokens` tables when they are missing. Existing
//! tables are left untouched.

use sqlx::MySqlPool;

use crate::InfrastructureError;

pub(crate) const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id CHAR(36) NOT NULL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_admin BOOLEAN NOT NULL DEFAULT FALSE,
    created_at DATETIME NOT NULL
)
"#;

// Token strings are ASCII so the unique index stays within key length limits.
pub(crate) const CREATE_JWT_TOKENS: &str = r#"
CREATE TABLE IF NOT EXISTS jwt_tokens (
    id CHAR(36) NOT NULL PRIMARY KEY,
    user_id CHAR(36) NOT NULL,
    token VARCHAR(2048) CHARACTER SET ascii COLLATE ascii_bin NOT NULL,
    token_type VARCHAR(16) NOT NULL,
    is_blacklisted BOOLEAN NOT NULL DEFAULT FALSE,
    created_at DATETIME NOT NULL,
    expires_at DATETIME NOT NULL,
    UNIQUE KEY uq_jwt_tokens_token (token),
    KEY idx_jwt_tokens_owner (user_id, token_type, is_blacklisted),
    CONSTRAINT fk_jwt_tokens_user FOREIGN KEY (user_id)
        REFERENCES users (id) ON DELETE CASCADE
)
"#;

/// Create missing tables in dependency order
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), InfrastructureError> {
    for (table, ddl) in [("users", CREATE_USERS), ("jwt_tokens", CREATE_JWT_TOKENS)] {
        sqlx::query(ddl).execute(pool).await.map_err(|e| {
            tracing::error!(table, error = %e, "Failed to create table");
            InfrastructureError::Database(e)
        })?;
        tracing::debug!(table, "Table ensured");
    }

    tracing::info!("Database schema ready");
    Ok(())
}
