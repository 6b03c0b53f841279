//! Thread-safe implementations of the core stores
//!
//! These let several sessions, each with its own `TransactionEngine`, run
//! against the same accounts and the same ledger:
//!
//! - **SharedAccountStore**: per-account locking using DashMap
//! - **SharedLedger**: mutex-serialized appends
//!
//! Lock order is always account first, ledger second.

pub mod account_store;
pub mod ledger;

pub use account_store::SharedAccountStore;
pub use ledger::SharedLedger;
