//! Monetary amounts for the ATM simulator
//!
//! All balances and amounts are held as an unsigned count of minor units
//! (cents). A `Money` value can never be negative, so the no-overdraft
//! invariant of an account is carried by the type itself. User input is
//! parsed exactly through `rust_decimal` so that no floating-point rounding
//! ever reaches a balance.

use super::error::AmountError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places in a displayed amount
pub const DECIMAL_PLACES: u32 = 2;

/// Minor units per major currency unit
pub const MINOR_UNITS_PER_MAJOR: u64 = 100;

/// A non-negative amount of money in minor units
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);
    pub const MAX: Money = Money(u64::MAX);

    /// Create an amount from a raw count of minor units
    pub const fn from_minor_units(minor_units: u64) -> Self {
        Money(minor_units)
    }

    /// Create an amount from whole major units
    ///
    /// Returns `None` if the amount cannot be represented.
    pub fn from_major_units(major_units: u64) -> Option<Self> {
        major_units.checked_mul(MINOR_UNITS_PER_MAJOR).map(Money)
    }

    pub const fn minor_units(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtract, returning `None` if the result would be negative
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_UNITS_PER_MAJOR,
            self.0 % MINOR_UNITS_PER_MAJOR
        )
    }
}

impl FromStr for Money {
    type Err = AmountError;

    /// Parse a decimal amount such as `150`, `150.5` or `$150.50`
    ///
    /// Rejects negative values, more than two decimal places and values
    /// that do not fit in the minor-unit representation.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        if digits.is_empty() {
            return Err(AmountError::malformed(input));
        }

        let value = Decimal::from_str(digits).map_err(|_| AmountError::malformed(input))?;

        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::negative(input));
        }

        if value.normalize().scale() > DECIMAL_PLACES {
            return Err(AmountError::too_precise(input));
        }

        let minor_units = value
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .and_then(|scaled| scaled.abs().to_u64())
            .ok_or_else(|| AmountError::too_large(input))?;

        Ok(Money(minor_units))
    }
}
