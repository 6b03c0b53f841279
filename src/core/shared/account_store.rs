//! Thread-safe account storage for concurrent sessions
//!
//! This module provides the `SharedAccountStore` struct, which manages account
//! states using concurrent data structures so several sessions can run
//! against the same accounts.
//!
//! # Design
//!
//! The store wraps a `DashMap` (a concurrent HashMap) in an `Arc`. Cloning
//! the store clones the handle, not the accounts. `update` holds the account's
//! entry lock while its closure runs, which gives every read-modify-write a
//! per-account critical section. Sessions on different accounts don't block
//! each other.

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountId, Money, StoreError};
use dashmap::DashMap;
use std::sync::Arc;

/// Cloneable handle to accounts shared between sessions
#[derive(Debug, Clone, Default)]
pub struct SharedAccountStore {
    /// Concurrent map of account states by id
    accounts: Arc<DashMap<AccountId, Account>>,
}

impl SharedAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
        }
    }

    /// Create a store seeded with the given accounts
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::new();
        for account in accounts {
            store.accounts.insert(account.id, account);
        }
        store
    }
}

impl AccountStore for SharedAccountStore {
    fn insert(&mut self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    fn account(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).map(|entry| entry.value().clone())
    }

    fn balance(&self, id: AccountId) -> Result<Money, StoreError> {
        self.accounts
            .get(&id)
            .map(|entry| entry.balance)
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn is_locked(&self, id: AccountId) -> bool {
        self.accounts
            .get(&id)
            .map(|entry| entry.locked)
            .unwrap_or(false)
    }

    /// Run `f` with the account's entry lock held
    fn update<F, R>(&mut self, id: AccountId, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Account) -> R,
    {
        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(id))?;
        Ok(f(entry.value_mut()))
    }
}
