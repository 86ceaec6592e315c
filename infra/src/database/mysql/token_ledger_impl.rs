//! MySQL implementation of the token ledger.
//!
//! Every operation runs on a SQLx transaction owned by
//! [`MySqlLedgerTransaction`]. Blacklisting is a conditional `UPDATE`, so of
//! two transactions racing on the same row only one sees an affected row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use tk_core::domain::entities::token::{LedgerRecord, TokenKind};
use tk_core::errors::DomainError;
use tk_core::repositories::{LedgerTransaction, TokenLedger};

use super::{decode_error, store_error};

/// MySQL-backed [`TokenLedger`]
#[derive(Clone)]
pub struct MySqlTokenLedger {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenLedger {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenLedger for MySqlTokenLedger {
    type Transaction = MySqlLedgerTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Failed to begin ledger transaction", e))?;

        Ok(MySqlLedgerTransaction { tx })
    }
}

/// Open ledger transaction. Dropping it rolls back.
pub struct MySqlLedgerTransaction {
    tx: Transaction<'static, MySql>,
}

impl MySqlLedgerTransaction {
    /// Convert database row to LedgerRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<LedgerRecord, DomainError> {
        let id: String = row.try_get("id").map_err(|e| decode_error("id", e))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| decode_error("user_id", e))?;
        let token_type: String = row
            .try_get("token_type")
            .map_err(|e| decode_error("token_type", e))?;

        Ok(LedgerRecord {
            id: Uuid::parse_str(&id).map_err(|e| decode_error("id", e))?,
            owner_id: Uuid::parse_str(&user_id).map_err(|e| decode_error("user_id", e))?,
            token: row.try_get("token").map_err(|e| decode_error("token", e))?,
            kind: token_type
                .parse::<TokenKind>()
                .map_err(|e| decode_error("token_type", e))?,
            blacklisted: row
                .try_get("is_blacklisted")
                .map_err(|e| decode_error("is_blacklisted", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| decode_error("created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| decode_error("expires_at", e))?,
        })
    }
}

#[async_trait]
impl LedgerTransaction for MySqlLedgerTransaction {
    async fn insert(&mut self, record: LedgerRecord) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO jwt_tokens (
                id, user_id, token, token_type, is_blacklisted, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(record.owner_id.to_string())
            .bind(&record.token)
            .bind(record.kind.as_str())
            .bind(record.blacklisted)
            .bind(record.created_at)
            .bind(record.expires_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("Failed to insert ledger record", e))?;

        Ok(())
    }

    async fn find(
        &mut self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<LedgerRecord>, DomainError> {
        let query = r#"
            SELECT id, user_id, token, token_type, is_blacklisted, created_at, expires_at
            FROM jwt_tokens
            WHERE token = ? AND token_type = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(token)
            .bind(kind.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| store_error("Failed to find ledger record", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn blacklist(&mut self, token: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE jwt_tokens
            SET is_blacklisted = TRUE
            WHERE token = ? AND is_blacklisted = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(token)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("Failed to blacklist token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn blacklist_owner(
        &mut self,
        owner_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let query = r#"
            UPDATE jwt_tokens
            SET is_blacklisted = TRUE
            WHERE user_id = ? AND token_type = ? AND is_blacklisted = FALSE AND expires_at > ?
        "#;

        let result = sqlx::query(query)
            .bind(owner_id.to_string())
            .bind(kind.as_str())
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("Failed to blacklist tokens for user", e))?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| store_error("Failed to commit ledger transaction", e))
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| store_error("Failed to roll back ledger transaction", e))
    }
}
