//! Core business logic module
//!
//! This module contains the transaction-integrity core:
//! - `traits` - Trait abstractions for interchangeable store and ledger implementations
//! - `account_store` - Account state for a single session
//! - `authenticator` - PIN verification and lockout
//! - `ledger` - Append-only audit ledger
//! - `engine` - Deposit, withdrawal and balance-check orchestration
//! - `shared` - Thread-safe store and ledger for concurrent sessions

pub mod account_store;
pub mod authenticator;
pub mod engine;
pub mod ledger;
pub mod shared;
pub mod traits;

pub use account_store::InMemoryAccountStore;
pub use authenticator::{Authenticator, DEFAULT_LOCKOUT_THRESHOLD};
pub use engine::{TransactionEngine, TransactionLimits};
pub use ledger::{History, TransactionLedger};
pub use shared::{SharedAccountStore, SharedLedger};
pub use traits::{AccountStore, AuditLog, LedgerSink};
