//! In-memory token ledger for tests and local runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::entities::token::{LedgerRecord, TokenKind};
use crate::errors::DomainError;

use super::r#trait::{LedgerTransaction, TokenLedger};

/// Token ledger held in process memory.
///
/// Transactions are serialized: `begin` waits for the previous transaction to
/// finish, then works on a private copy that `commit` publishes.
#[derive(Clone, Default)]
pub struct InMemoryTokenLedger {
    records: Arc<Mutex<Vec<LedgerRecord>>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed records, in insertion order
    pub async fn snapshot(&self) -> Vec<LedgerRecord> {
        self.records.lock().await.clone()
    }

    /// Committed record for `token`, if any
    pub async fn record(&self, token: &str) -> Option<LedgerRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.token == token)
            .cloned()
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    type Transaction = InMemoryLedgerTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DomainError> {
        let guard = self.records.clone().lock_owned().await;
        let working = guard.clone();
        Ok(InMemoryLedgerTransaction { guard, working })
    }
}

/// Transaction over [`InMemoryTokenLedger`]
pub struct InMemoryLedgerTransaction {
    guard: OwnedMutexGuard<Vec<LedgerRecord>>,
    working: Vec<LedgerRecord>,
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn insert(&mut self, record: LedgerRecord) -> Result<(), DomainError> {
        if self.working.iter().any(|r| r.token == record.token) {
            return Err(DomainError::store("Duplicate token in ledger"));
        }
        self.working.push(record);
        Ok(())
    }

    async fn find(
        &mut self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<LedgerRecord>, DomainError> {
        Ok(self
            .working
            .iter()
            .find(|r| r.token == token && r.kind == kind)
            .cloned())
    }

    async fn blacklist(&mut self, token: &str) -> Result<bool, DomainError> {
        match self
            .working
            .iter_mut()
            .find(|r| r.token == token && !r.blacklisted)
        {
            Some(record) => {
                record.blacklisted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn blacklist_owner(
        &mut self,
        owner_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let mut count = 0;
        for record in self.working.iter_mut() {
            if record.owner_id == owner_id && record.kind == kind && record.is_usable_at(now) {
                record.blacklisted = true;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn commit(self) -> Result<(), DomainError> {
        let Self { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}
