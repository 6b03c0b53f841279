//! Benchmark suite for the transaction engine
//!
//! Measures the cost of the audited operations using the divan benchmarking
//! framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Each benchmark runs a batch of operations against a fresh engine so the
//! ledger size at the start of every sample is the same.

use rust_atm_simulator::io::CsvLedgerSink;
use rust_atm_simulator::types::pin::SALT_LEN;
use rust_atm_simulator::{
    Account, Authenticator, InMemoryAccountStore, Money, PinHash, TransactionEngine,
    TransactionLedger, TransactionLimits,
};
use std::io;

const PIN: &str = "1234";

fn main() {
    divan::main();
}

fn engine(ledger: TransactionLedger) -> TransactionEngine {
    TransactionEngine::new(
        InMemoryAccountStore::with_accounts([Account::new(
            1,
            Money::from_minor_units(100_000),
            PinHash::with_salt(PIN, [0u8; SALT_LEN]),
        )]),
        ledger,
        Authenticator::default(),
        TransactionLimits::default(),
    )
}

/// Alternating deposits and withdrawals against the in-memory ledger
#[divan::bench(args = [100, 1_000, 10_000])]
fn deposit_withdraw(bencher: divan::Bencher, operations: usize) {
    bencher
        .with_inputs(|| engine(TransactionLedger::new()))
        .bench_local_values(|mut engine| {
            let mut session = engine.login(1, PIN).expect("Login failed");
            for i in 0..operations {
                let amount = Money::from_minor_units(500);
                if i % 2 == 0 {
                    engine.deposit(&mut session, amount).expect("Deposit failed");
                } else {
                    engine.withdraw(&mut session, amount).expect("Withdrawal failed");
                }
            }
            engine
        });
}

/// Same workload with every record serialized to CSV
#[divan::bench(args = [100, 1_000])]
fn deposit_withdraw_csv_sink(bencher: divan::Bencher, operations: usize) {
    bencher
        .with_inputs(|| engine(TransactionLedger::new().with_sink(CsvLedgerSink::new(io::sink(), true))))
        .bench_local_values(|mut engine| {
            let mut session = engine.login(1, PIN).expect("Login failed");
            for i in 0..operations {
                let amount = Money::from_minor_units(500);
                if i % 2 == 0 {
                    engine.deposit(&mut session, amount).expect("Deposit failed");
                } else {
                    engine.withdraw(&mut session, amount).expect("Withdrawal failed");
                }
            }
            engine
        });
}

/// Salted SHA-256 PIN verification
#[divan::bench]
fn verify_pin(bencher: divan::Bencher) {
    let hash = PinHash::with_salt(PIN, [0u8; SALT_LEN]);
    bencher.bench(|| hash.verify(divan::black_box(PIN)));
}
