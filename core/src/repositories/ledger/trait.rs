//! Token ledger traits defining transactional persistence of issued credentials.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{LedgerRecord, TokenKind};
use crate::errors::DomainError;

/// Durable store of every issued credential's metadata.
///
/// The ledger itself only opens transactions; every read and write goes
/// through a [`LedgerTransaction`] the caller commits or rolls back.
/// Implementations report connectivity problems as
/// [`DomainError::StoreUnavailable`].
#[async_trait]
pub trait TokenLedger: Send + Sync + 'static {
    type Transaction: LedgerTransaction;

    /// Begin a new ledger transaction
    async fn begin(&self) -> Result<Self::Transaction, DomainError>;
}

/// Unit of work over the token ledger.
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// every staged change.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Stage a new record
    ///
    /// # Returns
    /// * `Ok(())` - Record staged
    /// * `Err(DomainError)` - Write failed, including a duplicate token string
    async fn insert(&mut self, record: LedgerRecord) -> Result<(), DomainError>;

    /// Point lookup by exact token string and kind
    ///
    /// # Returns
    /// * `Ok(Some(LedgerRecord))` - Record found (blacklisted or not)
    /// * `Ok(None)` - No record for this `(token, kind)`
    /// * `Err(DomainError)` - Store error
    async fn find(
        &mut self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<LedgerRecord>, DomainError>;

    /// Blacklist the record holding `token`, if it is not blacklisted yet
    ///
    /// # Returns
    /// * `Ok(true)` - This call flipped the flag
    /// * `Ok(false)` - No such record, or it was already blacklisted
    async fn blacklist(&mut self, token: &str) -> Result<bool, DomainError>;

    /// Blacklist every record of `owner_id` and `kind` that is neither
    /// blacklisted nor expired at `now`
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records flipped
    async fn blacklist_owner(
        &mut self,
        owner_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Make every staged change durable
    async fn commit(self) -> Result<(), DomainError>;

    /// Discard every staged change
    async fn rollback(self) -> Result<(), DomainError>;
}
