//! CSV append log for ledger records
//!
//! This module mirrors ledger records to a flat CSV file, providing:
//! - `LedgerRow`, the on-disk row format
//! - `CsvLedgerSink`, a `LedgerSink` that writes and flushes one row per record
//! - `last_sequence` and `open_ledger_log` for continuing an existing log
//!   after a restart without reusing sequence numbers
//!
//! # Format
//!
//! Columns: `sequence,account,kind,amount,balance,timestamp`. Amounts use two
//! decimal places, kinds are snake case and timestamps are RFC 3339 in UTC.

use crate::core::ledger::FIRST_SEQUENCE;
use crate::core::traits::LedgerSink;
use crate::types::{
    AccountId, LedgerError, SequenceNumber, TransactionKind, TransactionRecord,
};
use chrono::SecondsFormat;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// One row of the ledger log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub sequence: SequenceNumber,
    pub account: AccountId,
    pub kind: TransactionKind,
    pub amount: String,
    pub balance: String,
    pub timestamp: String,
}

impl From<&TransactionRecord> for LedgerRow {
    fn from(record: &TransactionRecord) -> Self {
        LedgerRow {
            sequence: record.sequence,
            account: record.account,
            kind: record.kind,
            amount: record.amount.to_string(),
            balance: record.resulting_balance.to_string(),
            timestamp: record
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Ledger sink writing CSV rows
///
/// Each record is flushed before `write` returns, so a record reported as
/// appended has reached the underlying writer.
#[derive(Debug)]
pub struct CsvLedgerSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvLedgerSink<W> {
    /// Wrap `output`; the header row is written before the first record
    /// when `write_header` is set
    pub fn new(output: W, write_header: bool) -> Self {
        CsvLedgerSink {
            writer: WriterBuilder::new()
                .has_headers(write_header)
                .from_writer(output),
        }
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, LedgerError> {
        self.writer
            .into_inner()
            .map_err(|e| LedgerError::Sink {
                sequence: 0,
                message: e.to_string(),
            })
    }
}

impl<W: Write + Send> LedgerSink for CsvLedgerSink<W> {
    fn write(&mut self, record: &TransactionRecord) -> Result<(), LedgerError> {
        self.writer
            .serialize(LedgerRow::from(record))
            .map_err(|e| LedgerError::sink(record.sequence, e))?;
        self.writer
            .flush()
            .map_err(|e| LedgerError::sink(record.sequence, e))
    }
}

/// Highest sequence number recorded in an existing log
///
/// Returns `None` if the file does not exist or holds no rows.
pub fn last_sequence(path: &Path) -> Result<Option<SequenceNumber>, LedgerError> {
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| LedgerError::log_read(path, e))?;

    let mut last = None;
    for row in reader.deserialize::<LedgerRow>() {
        let row = row.map_err(|e| LedgerError::log_read(path, e))?;
        last = last.max(Some(row.sequence));
    }
    Ok(last)
}

/// Open a log for appending
///
/// # Returns
///
/// The sink and the sequence number the ledger should resume from.
pub fn open_ledger_log(path: &Path) -> Result<(CsvLedgerSink<File>, SequenceNumber), LedgerError> {
    let next_sequence = match last_sequence(path)? {
        Some(last) => last.checked_add(1).ok_or(LedgerError::SequenceExhausted)?,
        None => FIRST_SEQUENCE,
    };

    let has_content = path
        .metadata()
        .map(|metadata| metadata.len() > 0)
        .unwrap_or(false);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LedgerError::log_read(path, e))?;

    Ok((CsvLedgerSink::new(file, !has_content), next_sequence))
}
