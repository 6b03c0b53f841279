//! Core traits for account storage, audit logging and ledger sinks
//!
//! These traits let the single-session components and their shared,
//! thread-safe counterparts be used interchangeably by the authenticator and
//! the transaction engine.

use crate::core::ledger::History;
use crate::types::{
    Account, AccountId, Delta, LedgerEntry, LedgerError, Money, SequenceNumber, StoreError,
    TransactionRecord,
};

/// Trait for account state storage
///
/// `update` is the only way to reach a mutable account. Implementations must
/// run the closure inside the account's critical section, so a
/// read-modify-write cannot interleave with another update of the same
/// account.
pub trait AccountStore {
    /// Seed an account, replacing any account with the same id
    fn insert(&mut self, account: Account);

    /// Snapshot of an account
    fn account(&self, id: AccountId) -> Option<Account>;

    /// Current balance of an account
    fn balance(&self, id: AccountId) -> Result<Money, StoreError>;

    /// Whether the account exists and is locked
    fn is_locked(&self, id: AccountId) -> bool;

    /// Run `f` against the account while holding its lock
    ///
    /// Fails only with `StoreError::NotFound`.
    fn update<F, R>(&mut self, id: AccountId, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Account) -> R;

    /// Apply a balance change
    ///
    /// Either the balance changes and the new balance is returned, or
    /// nothing changes and an error is returned. Locked accounts are
    /// refused with `StoreError::Locked`.
    fn apply_delta(&mut self, id: AccountId, delta: Delta) -> Result<Money, StoreError> {
        self.apply_delta_with(id, delta, |_| Ok::<(), StoreError>(()))
    }

    /// Apply a balance change, gated on `commit`
    ///
    /// `commit` receives the would-be balance inside the critical section.
    /// The new balance is stored only if `commit` succeeds; otherwise its
    /// error is returned and the account is untouched.
    fn apply_delta_with<F, E>(&mut self, id: AccountId, delta: Delta, commit: F) -> Result<Money, E>
    where
        F: FnOnce(Money) -> Result<(), E>,
        E: From<StoreError>,
    {
        self.update(id, |account| -> Result<Money, E> {
            if account.locked {
                return Err(StoreError::locked(account.id).into());
            }
            let next = account.balance_after(delta).map_err(E::from)?;
            commit(next)?;
            account.balance = next;
            Ok(next)
        })
        .map_err(E::from)?
    }
}

/// Trait for the append-only audit log
pub trait AuditLog {
    /// Append an entry, returning its sequence number
    fn append(&mut self, entry: LedgerEntry) -> Result<SequenceNumber, LedgerError>;

    /// Run `f` over the account's history, oldest first
    fn with_history<R>(&self, account: AccountId, f: impl FnOnce(History<'_>) -> R) -> R;

    /// Number of records appended to this ledger
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// External collaborator that mirrors ledger records, e.g. to a flat file
///
/// A record is written to the sink before it becomes visible in the ledger.
/// An error here rejects the append.
pub trait LedgerSink: Send {
    fn write(&mut self, record: &TransactionRecord) -> Result<(), LedgerError>;
}
