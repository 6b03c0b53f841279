//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and balance deltas
//! - `money`: Integer minor-unit amounts
//! - `pin`: Salted PIN hashes
//! - `session`: Authentication sessions
//! - `transaction`: Ledger records and identifiers
//! - `error`: Error types for every layer

pub mod account;
pub mod error;
pub mod money;
pub mod pin;
pub mod session;
pub mod transaction;

pub use account::{Account, Delta};
pub use error::{AmountError, AuthError, ConfigError, EngineError, LedgerError, StoreError};
pub use money::Money;
pub use pin::PinHash;
pub use session::{AuthSession, SessionState};
pub use transaction::{AccountId, LedgerEntry, SequenceNumber, TransactionKind, TransactionRecord};
