//! ATM Simulator Library
//! # Overview
//!
//! This library provides the transaction-integrity core of a single-account
//! ATM simulator: PIN authentication with lockout, deposits, withdrawals and
//! balance inquiries, each committed together with a record in an
//! append-only audit ledger.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Money, Account, PinHash, ledger records, errors)
//! - [`core`] - Business logic components:
//!   - [`core::account_store`] - Account balances and lockout state
//!   - [`core::authenticator`] - PIN verification and lockout policy
//!   - [`core::ledger`] - Append-only ledger with contiguous sequence numbers
//!   - [`core::engine`] - Deposit, withdrawal and balance-check orchestration
//!   - [`core::shared`] - Thread-safe store and ledger for concurrent sessions
//! - [`io`] - CSV append log for ledger records
//! - [`config`] - Validated startup configuration
//! - [`cli`] - CLI arguments parsing and the interactive menu driver
//! - [`logging`] - Tracing subscriber setup
//!
//! # Invariants
//!
//! - A balance never goes below zero
//! - Every committed balance change has exactly one ledger record carrying
//!   the resulting balance, and no record exists for a change that was not
//!   committed
//! - Sequence numbers are unique, contiguous and increasing
//! - After the configured number of consecutive invalid PINs the account is
//!   locked until its lockout is reset

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod types;

pub use config::AtmConfig;
pub use core::{
    AccountStore, AuditLog, Authenticator, InMemoryAccountStore, TransactionEngine,
    TransactionLedger, TransactionLimits,
};
pub use types::{
    Account, AccountId, AuthError, AuthSession, EngineError, LedgerError, Money, PinHash,
    SequenceNumber, TransactionKind, TransactionRecord,
};
