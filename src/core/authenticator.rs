//! PIN authentication and lockout
//!
//! The `Authenticator` checks PIN attempts against the salted hash held in
//! the account store. It enforces the lockout policy:
//! - each consecutive failure increments the account's failure counter
//! - reaching the threshold locks the account
//! - a locked account rejects attempts without comparing the PIN
//! - a success resets the counter
//!
//! Every rejection is audited as a `LoginFailure` record. The record is
//! appended inside the account's critical section, before the counter
//! changes, so a failure that cannot be audited is not counted either.

use crate::core::traits::{AccountStore, AuditLog};
use crate::types::{AccountId, AuthError, AuthSession, LedgerEntry};
use tracing::{info, warn};

pub const DEFAULT_LOCKOUT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticator {
    lockout_threshold: u32,
}

impl Authenticator {
    /// Create an authenticator that locks after `lockout_threshold`
    /// consecutive failures (at least one)
    pub fn new(lockout_threshold: u32) -> Self {
        Authenticator {
            lockout_threshold: lockout_threshold.max(1),
        }
    }

    pub fn lockout_threshold(&self) -> u32 {
        self.lockout_threshold
    }

    /// Attempt to authenticate against an account
    ///
    /// # Returns
    ///
    /// An authenticated session on success.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidPin` if the PIN is wrong and attempts remain
    /// - `AuthError::LockedOut` if this failure reached the threshold, or
    ///   the account was already locked
    /// - `AuthError::AccountNotFound` for an unknown account
    /// - `AuthError::AuditFailure` if the failure could not be recorded
    pub fn attempt<S, L>(
        &self,
        accounts: &mut S,
        ledger: &mut L,
        account: AccountId,
        pin: &str,
    ) -> Result<AuthSession, AuthError>
    where
        S: AccountStore,
        L: AuditLog,
    {
        let threshold = self.lockout_threshold;

        let outcome = accounts
            .update(account, |state| -> Result<AuthSession, AuthError> {
                if state.locked {
                    ledger
                        .append(LedgerEntry::login_failure(account, state.balance))
                        .map_err(AuthError::AuditFailure)?;
                    return Err(AuthError::locked_out(account));
                }

                if state.pin_hash.verify(pin) {
                    state.failed_attempts = 0;
                    return Ok(AuthSession::authenticated(account, threshold));
                }

                ledger
                    .append(LedgerEntry::login_failure(account, state.balance))
                    .map_err(AuthError::AuditFailure)?;

                state.failed_attempts = state.failed_attempts.saturating_add(1);
                if state.failed_attempts >= threshold {
                    state.locked = true;
                    return Err(AuthError::locked_out(account));
                }

                Err(AuthError::InvalidPin {
                    attempts_remaining: threshold - state.failed_attempts,
                })
            })
            .map_err(|_| AuthError::account_not_found(account))?;

        match &outcome {
            Ok(_) => info!(account, "authenticated"),
            Err(AuthError::InvalidPin { attempts_remaining }) => {
                warn!(account, attempts_remaining, "invalid PIN")
            }
            Err(AuthError::LockedOut { .. }) => warn!(account, "account locked out"),
            Err(error) => warn!(account, %error, "authentication failed"),
        }

        outcome
    }

    /// Clear a lockout; the external reset of the lockout policy
    pub fn reset_lockout<S: AccountStore>(
        &self,
        accounts: &mut S,
        account: AccountId,
    ) -> Result<(), AuthError> {
        accounts
            .update(account, |state| {
                state.locked = false;
                state.failed_attempts = 0;
            })
            .map_err(|_| AuthError::account_not_found(account))?;

        info!(account, "lockout reset");
        Ok(())
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(DEFAULT_LOCKOUT_THRESHOLD)
    }
}
