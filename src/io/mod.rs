//! I/O module
//!
//! Handles the flat-file ledger log.
//!
//! # Components
//!
//! - `ledger_csv` - CSV sink for ledger records and log recovery on restart

pub mod ledger_csv;

pub use ledger_csv::{last_sequence, open_ledger_log, CsvLedgerSink, LedgerRow};
