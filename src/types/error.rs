//! Error types for the ATM simulator
//!
//! Each layer of the core has its own error enum so the driver can tell
//! exactly which component rejected an operation.
//!
//! # Error Categories
//!
//! - **AmountError**: user-supplied amounts that fail parsing or limits
//! - **StoreError**: account store lookups and balance arithmetic
//! - **LedgerError**: audit log appends and log file access
//! - **AuthError**: PIN verification and lockout
//! - **EngineError**: deposit, withdrawal and balance inquiry
//! - **ConfigError**: invalid startup options
//!
//! `LockedOut` and `AuditFailure` end the current session. Invalid amounts,
//! insufficient funds and invalid PINs are recoverable and the driver may
//! prompt again.

use super::money::Money;
use super::transaction::AccountId;
use thiserror::Error;

/// A user-supplied amount was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("'{input}' is not a valid amount")]
    Malformed { input: String },

    #[error("amount must be positive, got '{input}'")]
    Negative { input: String },

    #[error("'{input}' has more than two decimal places")]
    TooPrecise { input: String },

    #[error("'{input}' is too large")]
    TooLarge { input: String },

    #[error("amount must be greater than zero")]
    Zero,

    #[error("amount {amount} is below the minimum of {minimum}")]
    BelowMinimum { amount: Money, minimum: Money },

    #[error("amount {amount} is above the maximum of {maximum}")]
    AboveMaximum { amount: Money, maximum: Money },
}

impl AmountError {
    pub fn malformed(input: &str) -> Self {
        AmountError::Malformed {
            input: input.to_string(),
        }
    }

    pub fn negative(input: &str) -> Self {
        AmountError::Negative {
            input: input.to_string(),
        }
    }

    pub fn too_precise(input: &str) -> Self {
        AmountError::TooPrecise {
            input: input.to_string(),
        }
    }

    pub fn too_large(input: &str) -> Self {
        AmountError::TooLarge {
            input: input.to_string(),
        }
    }
}

/// Account store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The balance would go negative
    ///
    /// The account is left unchanged.
    #[error(
        "Insufficient funds in account {account}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        account: AccountId,
        available: Money,
        requested: Money,
    },

    #[error("Account {account} not found")]
    NotFound { account: AccountId },

    /// The balance would exceed the representable maximum
    #[error("Balance of account {account} would overflow")]
    Overflow { account: AccountId },

    /// Balance changes are refused while the account is locked
    #[error("Account {account} is locked")]
    Locked { account: AccountId },
}

impl StoreError {
    pub fn insufficient_funds(account: AccountId, available: Money, requested: Money) -> Self {
        StoreError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    pub fn not_found(account: AccountId) -> Self {
        StoreError::NotFound { account }
    }

    pub fn overflow(account: AccountId) -> Self {
        StoreError::Overflow { account }
    }

    pub fn locked(account: AccountId) -> Self {
        StoreError::Locked { account }
    }
}

/// Audit log failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The external sink refused the record
    ///
    /// Nothing was appended to the in-memory ledger.
    #[error("Failed to write ledger record {sequence}: {message}")]
    Sink { sequence: u64, message: String },

    #[error("Failed to read ledger log {path}: {message}")]
    LogRead { path: String, message: String },

    #[error("Ledger sequence numbers exhausted")]
    SequenceExhausted,
}

impl LedgerError {
    pub fn sink(sequence: u64, error: impl std::fmt::Display) -> Self {
        LedgerError::Sink {
            sequence,
            message: error.to_string(),
        }
    }

    pub fn log_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        LedgerError::LogRead {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Too many consecutive invalid PINs
    ///
    /// Terminal: no further attempts are compared until the lockout is reset.
    #[error("Account {account} is locked after too many invalid PIN attempts")]
    LockedOut { account: AccountId },

    #[error("Invalid PIN. {attempts_remaining} attempt{} remaining", if *attempts_remaining == 1 { "" } else { "s" })]
    InvalidPin { attempts_remaining: u32 },

    #[error("Account {account} not found")]
    AccountNotFound { account: AccountId },

    /// The login failure could not be recorded
    #[error("Unable to record login failure: {0}")]
    AuditFailure(LedgerError),
}

impl AuthError {
    pub fn locked_out(account: AccountId) -> Self {
        AuthError::LockedOut { account }
    }

    pub fn account_not_found(account: AccountId) -> Self {
        AuthError::AccountNotFound { account }
    }

    /// Whether the driver must abandon the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthError::LockedOut { .. } | AuthError::AuditFailure(_))
    }
}

/// Transaction engine failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Wraps the store's `InsufficientFunds`
    #[error("{0}")]
    InsufficientFunds(StoreError),

    #[error("Session is not authenticated")]
    Unauthenticated,

    /// The balance change was not committed because its audit record
    /// could not be appended
    #[error("Transaction could not be recorded in the audit log: {0}")]
    AuditFailure(LedgerError),

    #[error("Account {account} not found")]
    AccountNotFound { account: AccountId },

    #[error("Balance of account {account} would overflow")]
    Overflow { account: AccountId },
}

impl EngineError {
    /// Whether the driver must abandon the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineError::AuditFailure(_))
    }
}

impl From<StoreError> for EngineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::InsufficientFunds { .. } => EngineError::InsufficientFunds(error),
            StoreError::NotFound { account } => EngineError::AccountNotFound { account },
            StoreError::Overflow { account } => EngineError::Overflow { account },
            StoreError::Locked { .. } => EngineError::Unauthenticated,
        }
    }
}

/// Invalid startup configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("PIN must be {min} to {max} digits")]
    InvalidPin { min: usize, max: usize },

    #[error("Invalid PIN hash: {message}")]
    InvalidPinHash { message: String },

    #[error("Minimum amount {minimum} exceeds maximum amount {maximum}")]
    InvalidLimits { minimum: Money, maximum: Money },

    #[error("Minimum amount must be greater than zero")]
    ZeroMinimum,

    #[error("Lockout threshold must be at least 1")]
    ZeroLockoutThreshold,

    #[error("Cannot open ledger log: {0}")]
    LedgerLog(#[from] LedgerError),
}

impl ConfigError {
    pub fn invalid_pin_hash(message: impl std::fmt::Display) -> Self {
        ConfigError::InvalidPinHash {
            message: message.to_string(),
        }
    }
}
