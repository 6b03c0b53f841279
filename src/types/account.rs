//! Account state
//!
//! An `Account` holds the balance, the PIN hash and the lockout counters for
//! one simulated customer. Accounts are seeded at startup and only change
//! through the account store's update path.

use super::error::StoreError;
use super::money::Money;
use super::pin::PinHash;
use super::transaction::AccountId;

/// A signed change to an account balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Credit(Money),
    Debit(Money),
}

/// Account state
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,

    /// Current balance; never negative
    pub balance: Money,

    pub pin_hash: PinHash,

    /// Consecutive failed PIN attempts since the last success
    pub failed_attempts: u32,

    /// Set once the lockout threshold is reached
    ///
    /// Cleared only by an external reset.
    pub locked: bool,
}

impl Account {
    /// Create an unlocked account with no failed attempts
    pub fn new(id: AccountId, balance: Money, pin_hash: PinHash) -> Self {
        Account {
            id,
            balance,
            pin_hash,
            failed_attempts: 0,
            locked: false,
        }
    }

    /// Compute the balance that applying `delta` would produce
    ///
    /// # Errors
    ///
    /// - `StoreError::InsufficientFunds` if a debit exceeds the balance
    /// - `StoreError::Overflow` if a credit exceeds the representable maximum
    pub fn balance_after(&self, delta: Delta) -> Result<Money, StoreError> {
        match delta {
            Delta::Credit(amount) => self
                .balance
                .checked_add(amount)
                .ok_or_else(|| StoreError::overflow(self.id)),
            Delta::Debit(amount) => self.balance.checked_sub(amount).ok_or_else(|| {
                StoreError::insufficient_funds(self.id, self.balance, amount)
            }),
        }
    }
}
