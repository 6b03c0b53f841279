//! Validated startup configuration
//!
//! `AtmConfig` is built from the command line by `CliArgs::to_config` and
//! knows how to seed the account and assemble a ready-to-use engine.

use crate::core::{
    AccountStore, Authenticator, InMemoryAccountStore, TransactionEngine, TransactionLedger,
    TransactionLimits, DEFAULT_LOCKOUT_THRESHOLD,
};
use crate::io::open_ledger_log;
use crate::types::{Account, AccountId, ConfigError, Money, PinHash};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_ACCOUNT_ID: AccountId = 1;
pub const DEFAULT_PIN: &str = "1234";
pub const MIN_PIN_DIGITS: usize = 4;
pub const MAX_PIN_DIGITS: usize = 12;

/// Default starting balance, 1000.00
pub const DEFAULT_INITIAL_BALANCE: Money = Money::from_minor_units(100_000);

#[derive(Debug, Clone, PartialEq)]
pub struct AtmConfig {
    pub account_id: AccountId,
    pub initial_balance: Money,
    pub pin_hash: PinHash,
    pub lockout_threshold: u32,
    pub limits: TransactionLimits,
    /// Optional CSV append log mirroring the ledger
    pub ledger_log: Option<PathBuf>,
}

impl AtmConfig {
    /// Configuration with every option at its default except the PIN hash
    pub fn new(pin_hash: PinHash) -> Self {
        AtmConfig {
            account_id: DEFAULT_ACCOUNT_ID,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            pin_hash,
            lockout_threshold: DEFAULT_LOCKOUT_THRESHOLD,
            limits: TransactionLimits::default(),
            ledger_log: None,
        }
    }

    /// Check the cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lockout_threshold == 0 {
            return Err(ConfigError::ZeroLockoutThreshold);
        }
        if self.limits.minimum.is_zero() {
            return Err(ConfigError::ZeroMinimum);
        }
        if self.limits.minimum > self.limits.maximum {
            return Err(ConfigError::InvalidLimits {
                minimum: self.limits.minimum,
                maximum: self.limits.maximum,
            });
        }
        Ok(())
    }

    /// Seed the account and build the engine
    ///
    /// With a ledger log configured, the ledger resumes numbering after the
    /// last record already in the file.
    pub fn build_engine(&self) -> Result<TransactionEngine, ConfigError> {
        self.validate()?;

        let mut accounts = InMemoryAccountStore::new();
        accounts.insert(Account::new(
            self.account_id,
            self.initial_balance,
            self.pin_hash.clone(),
        ));

        let ledger = match &self.ledger_log {
            Some(path) => {
                let (sink, next_sequence) = open_ledger_log(path)?;
                info!(path = %path.display(), next_sequence, "ledger log opened");
                TransactionLedger::resume_from(next_sequence).with_sink(sink)
            }
            None => TransactionLedger::new(),
        };

        Ok(TransactionEngine::new(
            accounts,
            ledger,
            Authenticator::new(self.lockout_threshold),
            self.limits,
        ))
    }
}

/// Check that a PIN is all digits and of acceptable length
pub fn validate_pin(pin: &str) -> Result<(), ConfigError> {
    let valid_length = (MIN_PIN_DIGITS..=MAX_PIN_DIGITS).contains(&pin.len());
    if valid_length && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPin {
            min: MIN_PIN_DIGITS,
            max: MAX_PIN_DIGITS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pin::SALT_LEN;
    use rstest::rstest;
    use tempfile::tempdir;

    fn config() -> AtmConfig {
        AtmConfig::new(PinHash::with_salt(DEFAULT_PIN, [2u8; SALT_LEN]))
    }

    #[rstest]
    #[case::four_digits("1234")]
    #[case::twelve_digits("123456789012")]
    fn test_valid_pins(#[case] pin: &str) {
        assert_eq!(validate_pin(pin), Ok(()));
    }

    #[rstest]
    #[case::too_short("123")]
    #[case::too_long("1234567890123")]
    #[case::letters("12a4")]
    #[case::empty("")]
    fn test_invalid_pins(#[case] pin: &str) {
        assert!(matches!(validate_pin(pin), Err(ConfigError::InvalidPin { .. })));
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = config();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.initial_balance.to_string(), "1000.00");
        assert_eq!(config.lockout_threshold, 3);
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let mut config = config();
        config.limits = TransactionLimits::new(
            Money::from_minor_units(500),
            Money::from_minor_units(100),
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimits { .. })
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = config();
        config.lockout_threshold = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLockoutThreshold));
        assert!(config.build_engine().is_err());
    }

    #[test]
    fn test_build_engine_seeds_account() {
        let mut engine = config().build_engine().unwrap();
        let mut session = engine.login(DEFAULT_ACCOUNT_ID, DEFAULT_PIN).unwrap();

        assert_eq!(
            engine.check_balance(&mut session),
            Ok(DEFAULT_INITIAL_BALANCE)
        );
    }

    #[test]
    fn test_build_engine_with_ledger_log() {
        let dir = tempdir().unwrap();
        let mut config = config();
        config.ledger_log = Some(dir.path().join("ledger.csv"));

        let mut engine = config.build_engine().unwrap();
        let mut session = engine.login(DEFAULT_ACCOUNT_ID, DEFAULT_PIN).unwrap();
        engine.deposit(&mut session, Money::from_minor_units(100)).unwrap();
        drop(engine);

        // A restarted simulator continues the numbering
        let engine = config.build_engine().unwrap();
        assert_eq!(engine.ledger().next_sequence(), 2);
        assert!(engine.ledger().is_empty());
    }
}
