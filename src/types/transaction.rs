//! Ledger record types
//!
//! A `TransactionRecord` is produced only by the ledger at append time. The
//! components that emit records hand over a `LedgerEntry`; the ledger stamps
//! it with the next sequence number and the current time.

use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier
pub type AccountId = u32;

/// Ledger sequence number, assigned at append time
pub type SequenceNumber = u64;

/// Kinds of audited events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Funds credited to the account
    Deposit,

    /// Funds debited from the account
    Withdrawal,

    /// Balance inquiry; never changes the balance
    BalanceCheck,

    /// Rejected PIN attempt, including attempts against a locked account
    LoginFailure,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::BalanceCheck => "Balance Check",
            TransactionKind::LoginFailure => "Login Failure",
        };
        f.write_str(label)
    }
}

/// An event waiting to be appended to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub account: AccountId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub resulting_balance: Money,
}

impl LedgerEntry {
    pub fn new(
        account: AccountId,
        kind: TransactionKind,
        amount: Money,
        resulting_balance: Money,
    ) -> Self {
        LedgerEntry {
            account,
            kind,
            amount,
            resulting_balance,
        }
    }

    /// A rejected login; the balance is reported unchanged
    pub fn login_failure(account: AccountId, balance: Money) -> Self {
        LedgerEntry::new(account, TransactionKind::LoginFailure, Money::ZERO, balance)
    }

    /// Stamp the entry with its sequence number and time
    pub fn into_record(self, sequence: SequenceNumber, timestamp: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord {
            sequence,
            account: self.account,
            kind: self.kind,
            amount: self.amount,
            resulting_balance: self.resulting_balance,
            timestamp,
        }
    }
}

/// An immutable ledger record
///
/// Ordering by `sequence` is authoritative; timestamps are informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub sequence: SequenceNumber,
    pub account: AccountId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub resulting_balance: Money,
    pub timestamp: DateTime<Utc>,
}
