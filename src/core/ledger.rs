//! Append-only transaction ledger
//!
//! This module provides the `TransactionLedger`, the audit trail of every
//! committed operation and every rejected login.
//!
//! # Sequence Numbers
//!
//! Each ledger instance hands out strictly increasing, contiguous sequence
//! numbers starting at 1, or at the value passed to
//! [`TransactionLedger::resume_from`] when continuing an existing log after
//! a restart. Numbers are assigned at append time and never reused.
//!
//! The counter belongs to the instance, not the process: two ledgers
//! created with `new` both start at 1. A process that must not repeat
//! numbers shares one ledger (see `SharedLedger`), and a restarted process
//! continues from the CSV log through `resume_from`.
//!
//! # Sinks
//!
//! An optional [`LedgerSink`] receives each record before it is pushed to
//! memory. If the sink fails, the append fails and the ledger is unchanged.
//!
//! There is no update or delete operation.

use crate::core::traits::{AuditLog, LedgerSink};
use crate::types::{AccountId, LedgerEntry, LedgerError, SequenceNumber, TransactionRecord};
use chrono::Utc;
use std::iter::FusedIterator;
use std::slice;

pub const FIRST_SEQUENCE: SequenceNumber = 1;

/// Append-only ledger of transaction records
pub struct TransactionLedger {
    records: Vec<TransactionRecord>,
    next_sequence: SequenceNumber,
    sink: Option<Box<dyn LedgerSink>>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::resume_from(FIRST_SEQUENCE)
    }

    /// Create an empty ledger whose first record gets `next_sequence`
    pub fn resume_from(next_sequence: SequenceNumber) -> Self {
        TransactionLedger {
            records: Vec::new(),
            next_sequence,
            sink: None,
        }
    }

    /// Mirror every appended record to `sink`
    pub fn with_sink(mut self, sink: impl LedgerSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Append an entry and return its sequence number
    ///
    /// # Errors
    ///
    /// - `LedgerError::Sink` if the sink rejects the record
    /// - `LedgerError::SequenceExhausted` if no sequence number is left
    pub fn append(&mut self, entry: LedgerEntry) -> Result<SequenceNumber, LedgerError> {
        let sequence = self.next_sequence;
        let following = sequence
            .checked_add(1)
            .ok_or(LedgerError::SequenceExhausted)?;

        let record = entry.into_record(sequence, Utc::now());
        if let Some(sink) = self.sink.as_mut() {
            sink.write(&record)?;
        }

        self.records.push(record);
        self.next_sequence = following;
        Ok(sequence)
    }

    /// Lazy history of one account, ordered by sequence number
    ///
    /// The iterator is finite and can be restarted by cloning it before
    /// consumption or by calling `history` again.
    pub fn history(&self, account: AccountId) -> History<'_> {
        History {
            account,
            records: self.records.iter(),
        }
    }

    /// All records in append order
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Sequence number the next append will receive
    pub fn next_sequence(&self) -> SequenceNumber {
        self.next_sequence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for TransactionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog for TransactionLedger {
    fn append(&mut self, entry: LedgerEntry) -> Result<SequenceNumber, LedgerError> {
        TransactionLedger::append(self, entry)
    }

    fn with_history<R>(&self, account: AccountId, f: impl FnOnce(History<'_>) -> R) -> R {
        f(self.history(account))
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Iterator over one account's ledger records
#[derive(Debug, Clone)]
pub struct History<'a> {
    account: AccountId,
    records: slice::Iter<'a, TransactionRecord>,
}

impl<'a> Iterator for History<'a> {
    type Item = &'a TransactionRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let account = self.account;
        self.records.find(|record| record.account == account)
    }
}

impl FusedIterator for History<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Money, TransactionKind};
    use std::sync::{Arc, Mutex};

    fn deposit(account: AccountId, amount: u64, balance: u64) -> LedgerEntry {
        LedgerEntry::new(
            account,
            TransactionKind::Deposit,
            Money::from_minor_units(amount),
            Money::from_minor_units(balance),
        )
    }

    /// Sink that records what it saw and can be told to fail
    #[derive(Clone, Default)]
    struct RecordingSink {
        seen: Arc<Mutex<Vec<SequenceNumber>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl LedgerSink for RecordingSink {
        fn write(&mut self, record: &TransactionRecord) -> Result<(), LedgerError> {
            if *self.fail.lock().unwrap() {
                return Err(LedgerError::sink(record.sequence, "disk full"));
            }
            self.seen.lock().unwrap().push(record.sequence);
            Ok(())
        }
    }

    #[test]
    fn test_sequence_numbers_are_contiguous() {
        let mut ledger = TransactionLedger::new();

        let sequences: Vec<SequenceNumber> = (0..5)
            .map(|i| ledger.append(deposit(1, 100, 100 * (i + 1))).unwrap())
            .collect();

        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
        assert_eq!(ledger.next_sequence(), 6);
        assert_eq!(ledger.len(), 5);
    }

    #[test]
    fn test_resume_from_continues_numbering() {
        let mut ledger = TransactionLedger::resume_from(42);
        assert_eq!(ledger.append(deposit(1, 1, 1)), Ok(42));
        assert_eq!(ledger.append(deposit(1, 1, 2)), Ok(43));
    }

    #[test]
    fn test_sequence_counter_is_per_instance() {
        let mut first = TransactionLedger::new();
        let mut second = TransactionLedger::new();

        assert_eq!(first.append(deposit(1, 100, 100)), Ok(1));
        assert_eq!(second.append(deposit(1, 100, 100)), Ok(1));
        assert_eq!(first.append(deposit(1, 100, 200)), Ok(2));
    }

    #[test]
    fn test_exhausted_sequence_rejects_append() {
        let mut ledger = TransactionLedger::resume_from(SequenceNumber::MAX);
        assert_eq!(
            ledger.append(deposit(1, 1, 1)),
            Err(LedgerError::SequenceExhausted)
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_history_filters_by_account_in_order() {
        let mut ledger = TransactionLedger::new();
        ledger.append(deposit(1, 100, 100)).unwrap();
        ledger.append(deposit(2, 500, 500)).unwrap();
        ledger.append(deposit(1, 50, 150)).unwrap();

        let sequences: Vec<SequenceNumber> =
            ledger.history(1).map(|record| record.sequence).collect();
        assert_eq!(sequences, vec![1, 3]);

        assert_eq!(ledger.history(2).count(), 1);
        assert_eq!(ledger.history(3).count(), 0);
    }

    #[test]
    fn test_history_is_restartable() {
        let mut ledger = TransactionLedger::new();
        ledger.append(deposit(1, 100, 100)).unwrap();
        ledger.append(deposit(1, 100, 200)).unwrap();

        let history = ledger.history(1);
        let first_pass: Vec<_> = history.clone().collect();
        let second_pass: Vec<_> = history.collect();

        assert_eq!(first_pass.len(), 2);
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_sink_sees_every_record() {
        let sink = RecordingSink::default();
        let mut ledger = TransactionLedger::new().with_sink(sink.clone());

        ledger.append(deposit(1, 1, 1)).unwrap();
        ledger.append(deposit(1, 1, 2)).unwrap();

        assert_eq!(*sink.seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_sink_failure_leaves_ledger_unchanged() {
        let sink = RecordingSink::default();
        let mut ledger = TransactionLedger::new().with_sink(sink.clone());
        ledger.append(deposit(1, 1, 1)).unwrap();

        *sink.fail.lock().unwrap() = true;
        let result = ledger.append(deposit(1, 1, 2));

        assert_eq!(result, Err(LedgerError::sink(2, "disk full")));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.next_sequence(), 2);

        // The number is not burned by the failed append
        *sink.fail.lock().unwrap() = false;
        assert_eq!(ledger.append(deposit(1, 1, 2)), Ok(2));
    }
}
