//! ATM Simulator CLI
//!
//! Interactive ATM session for a single simulated account.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --initial-balance 250.00 --pin 4321
//! cargo run -- --ledger-log ledger.csv
//! RUST_LOG=info cargo run
//! ```
//!
//! The program prompts for the PIN, then shows a menu for balance inquiries,
//! deposits, withdrawals and the transaction history. Diagnostics are
//! written to stderr.
//!
//! # Exit Codes
//!
//! - 0: The user exited the menu, or input ended at the menu
//! - 1: Account locked, input ended before login, invalid configuration or
//!   an unrecoverable error (for example the ledger log could not be written)

use rust_atm_simulator::cli::{self, SessionDriver};
use rust_atm_simulator::logging;
use std::process;

fn main() {
    logging::init();

    let mut args = cli::parse_args();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut engine = match config.build_engine() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut driver = SessionDriver::new(stdin.lock(), stdout.lock());

    let result = driver.run(&mut engine, config.account_id);
    drop(driver);

    match result {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
