use crate::config::{validate_pin, AtmConfig, DEFAULT_PIN};
use crate::core::TransactionLimits;
use crate::types::{AccountId, ConfigError, Money, PinHash};
use clap::Parser;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Simulate an ATM session against a single account
#[derive(Parser, Debug)]
#[command(name = "atm-simulator")]
#[command(about = "Simulate an ATM session with PIN lockout and an audit ledger", long_about = None)]
pub struct CliArgs {
    /// Account the session logs in to
    #[arg(long = "account-id", value_name = "ID", default_value_t = 1)]
    pub account_id: AccountId,

    /// Balance the account starts with
    #[arg(
        long = "initial-balance",
        value_name = "AMOUNT",
        default_value = "1000.00",
        help = "Starting balance with at most two decimal places"
    )]
    pub initial_balance: Money,

    /// PIN in clear text, hashed at startup
    #[arg(
        long = "pin",
        value_name = "PIN",
        conflicts_with = "pin_hash",
        help = "Account PIN, 4 to 12 digits (default: 1234)"
    )]
    pub pin: Option<String>,

    /// Pre-computed PIN hash
    #[arg(
        long = "pin-hash",
        value_name = "SALT:DIGEST",
        help = "Salted SHA-256 PIN hash as salt_hex:digest_hex"
    )]
    pub pin_hash: Option<String>,

    /// Consecutive invalid PINs before the account locks
    #[arg(long = "lockout-threshold", value_name = "COUNT", default_value_t = 3)]
    pub lockout_threshold: u32,

    /// Smallest accepted deposit or withdrawal
    #[arg(long = "min-amount", value_name = "AMOUNT", default_value = "0.01")]
    pub min_amount: Money,

    /// Largest accepted deposit or withdrawal
    #[arg(long = "max-amount", value_name = "AMOUNT", default_value = "10000.00")]
    pub max_amount: Money,

    /// CSV file mirroring every ledger record
    #[arg(
        long = "ledger-log",
        value_name = "PATH",
        help = "Append ledger records to this CSV file, continuing its numbering"
    )]
    pub ledger_log: Option<PathBuf>,
}

impl CliArgs {
    /// Create an AtmConfig from CLI arguments
    ///
    /// A clear-text PIN is validated and hashed with a fresh salt, then
    /// taken out of the arguments and wiped. A pre-computed hash is decoded
    /// as given.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the PIN, the PIN hash, the lockout
    /// threshold or the amount limits are invalid.
    pub fn to_config(&mut self) -> Result<AtmConfig, ConfigError> {
        let pin = Zeroizing::new(self.pin.take().unwrap_or_else(|| DEFAULT_PIN.to_string()));
        let pin_hash = match &self.pin_hash {
            Some(encoded) => PinHash::from_hex(encoded)?,
            None => {
                validate_pin(&pin)?;
                PinHash::new(&pin)
            }
        };

        let config = AtmConfig {
            account_id: self.account_id,
            initial_balance: self.initial_balance,
            pin_hash,
            lockout_threshold: self.lockout_threshold,
            limits: TransactionLimits::new(self.min_amount, self.max_amount),
            ledger_log: self.ledger_log.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}
