pub mod identity;
pub mod ledger;

pub use identity::{CredentialAuthenticator, IdentityResolver, InMemoryUserStore, UserRegistry};
pub use ledger::{InMemoryLedgerTransaction, InMemoryTokenLedger, LedgerTransaction, TokenLedger};
