//! Thread-safe ledger handle for concurrent sessions
//!
//! `SharedLedger` puts a `TransactionLedger` behind an `Arc<Mutex<_>>`. Appends
//! are serialized by the mutex, so sequence numbers stay contiguous no matter
//! how many sessions write. The engine appends while it holds an account's
//! entry lock; the ledger lock is always taken second and released before
//! the account lock.

use crate::core::ledger::{History, TransactionLedger};
use crate::core::traits::AuditLog;
use crate::types::{AccountId, LedgerEntry, LedgerError, SequenceNumber, TransactionRecord};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to a ledger shared between sessions
#[derive(Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<TransactionLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: TransactionLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Copy of all records in append order
    pub fn snapshot(&self) -> Vec<TransactionRecord> {
        self.lock().records().to_vec()
    }

    pub fn next_sequence(&self) -> SequenceNumber {
        self.lock().next_sequence()
    }

    // Records are only ever pushed whole, so a poisoned lock still guards a
    // consistent ledger.
    fn lock(&self) -> MutexGuard<'_, TransactionLedger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuditLog for SharedLedger {
    fn append(&mut self, entry: LedgerEntry) -> Result<SequenceNumber, LedgerError> {
        self.lock().append(entry)
    }

    fn with_history<R>(&self, account: AccountId, f: impl FnOnce(History<'_>) -> R) -> R {
        let ledger = self.lock();
        f(ledger.history(account))
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
