//! Account storage module
//!
//! This module provides the `InMemoryAccountStore` struct which maintains the
//! state of the seeded accounts for a single session.
//!
//! The store is responsible for:
//! - Holding account balances, PIN hashes and lockout state
//! - Exposing the single closure-based mutation path used by the engine and
//!   the authenticator

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountId, Money, StoreError};
use std::collections::HashMap;

/// Single-session account store
///
/// Exclusive access through `&mut self` is what serializes updates here;
/// see `SharedAccountStore` for the multi-session variant.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: HashMap<AccountId, Account>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        InMemoryAccountStore {
            accounts: HashMap::new(),
        }
    }

    /// Create a store seeded with the given accounts
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        InMemoryAccountStore {
            accounts: accounts
                .into_iter()
                .map(|account| (account.id, account))
                .collect(),
        }
    }
}

impl AccountStore for InMemoryAccountStore {
    fn insert(&mut self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    fn account(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).cloned()
    }

    fn balance(&self, id: AccountId) -> Result<Money, StoreError> {
        self.accounts
            .get(&id)
            .map(|account| account.balance)
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn is_locked(&self, id: AccountId) -> bool {
        self.accounts
            .get(&id)
            .is_some_and(|account| account.locked)
    }

    fn update<F, R>(&mut self, id: AccountId, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Account) -> R,
    {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(id))?;
        Ok(f(account))
    }
}
