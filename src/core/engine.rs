//! Transaction processing engine
//!
//! This module provides the TransactionEngine that orchestrates deposits,
//! withdrawals and balance inquiries by coordinating between an
//! `AccountStore` and an `AuditLog`.
//!
//! The engine enforces business rules such as:
//! - Every operation requires an authenticated session on an unlocked account
//! - Amounts must be positive and within the configured limits
//! - A balance change is committed only together with its ledger record
//!
//! The ledger append runs inside the store's critical section for the
//! account. If it fails, the new balance is never stored and the operation
//! reports `EngineError::AuditFailure`, so the ledger cannot miss a record
//! for a committed change.

use crate::core::account_store::InMemoryAccountStore;
use crate::core::authenticator::Authenticator;
use crate::core::ledger::{History, TransactionLedger};
use crate::core::traits::{AccountStore, AuditLog};
use crate::types::{
    AccountId, AmountError, AuthError, AuthSession, Delta, EngineError, LedgerEntry, Money,
    TransactionKind,
};
use tracing::{error, info, warn};

/// Inclusive bounds on a single deposit or withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionLimits {
    pub minimum: Money,
    pub maximum: Money,
}

impl TransactionLimits {
    pub const DEFAULT_MINIMUM: Money = Money::from_minor_units(1);
    pub const DEFAULT_MAXIMUM: Money = Money::from_minor_units(1_000_000);

    pub fn new(minimum: Money, maximum: Money) -> Self {
        TransactionLimits { minimum, maximum }
    }

    /// Validate an amount against the limits
    ///
    /// Zero is always rejected, whatever the configured minimum.
    pub fn check(&self, amount: Money) -> Result<(), AmountError> {
        if amount.is_zero() {
            return Err(AmountError::Zero);
        }
        if amount < self.minimum {
            return Err(AmountError::BelowMinimum {
                amount,
                minimum: self.minimum,
            });
        }
        if amount > self.maximum {
            return Err(AmountError::AboveMaximum {
                amount,
                maximum: self.maximum,
            });
        }
        Ok(())
    }
}

impl Default for TransactionLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MINIMUM, Self::DEFAULT_MAXIMUM)
    }
}

/// Transaction processing engine
///
/// Owns the account store, the ledger and the authenticator for one
/// simulated ATM. For several concurrent sessions, give each session its own
/// engine over a `SharedAccountStore` and a `SharedLedger`.
pub struct TransactionEngine<S = InMemoryAccountStore, L = TransactionLedger> {
    accounts: S,
    ledger: L,
    authenticator: Authenticator,
    limits: TransactionLimits,
}

impl<S, L> TransactionEngine<S, L>
where
    S: AccountStore,
    L: AuditLog,
{
    pub fn new(
        accounts: S,
        ledger: L,
        authenticator: Authenticator,
        limits: TransactionLimits,
    ) -> Self {
        TransactionEngine {
            accounts,
            ledger,
            authenticator,
            limits,
        }
    }

    /// Attempt to log in to an account
    pub fn login(&mut self, account: AccountId, pin: &str) -> Result<AuthSession, AuthError> {
        self.authenticator
            .attempt(&mut self.accounts, &mut self.ledger, account, pin)
    }

    /// Clear an account's lockout
    pub fn reset_lockout(&mut self, account: AccountId) -> Result<(), AuthError> {
        self.authenticator.reset_lockout(&mut self.accounts, account)
    }

    /// End a session
    pub fn logout(&self, session: &mut AuthSession) {
        if session.is_authenticated() {
            info!(account = session.account(), "logged out");
        }
        session.logout();
    }

    /// Deposit funds into the session's account
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// - `EngineError::Unauthenticated` if the session is not authenticated
    /// - `EngineError::InvalidAmount` if the amount is zero or outside the limits
    /// - `EngineError::Overflow` if the balance would exceed the maximum
    /// - `EngineError::AuditFailure` if the ledger rejected the record
    pub fn deposit(&mut self, session: &mut AuthSession, amount: Money) -> Result<Money, EngineError> {
        let account = self.ensure_authenticated(session)?;
        self.check_amount(account, amount)?;

        let balance = self.commit(
            session,
            Delta::Credit(amount),
            TransactionKind::Deposit,
            amount,
        )?;
        info!(account, %amount, %balance, "deposit committed");
        Ok(balance)
    }

    /// Withdraw funds from the session's account
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// - `EngineError::Unauthenticated` if the session is not authenticated
    /// - `EngineError::InvalidAmount` if the amount is zero or outside the limits
    /// - `EngineError::InsufficientFunds` if the amount exceeds the balance
    /// - `EngineError::AuditFailure` if the ledger rejected the record
    pub fn withdraw(&mut self, session: &mut AuthSession, amount: Money) -> Result<Money, EngineError> {
        let account = self.ensure_authenticated(session)?;
        self.check_amount(account, amount)?;

        let balance = self.commit(
            session,
            Delta::Debit(amount),
            TransactionKind::Withdrawal,
            amount,
        )?;
        info!(account, %amount, %balance, "withdrawal committed");
        Ok(balance)
    }

    /// Read the session's balance
    ///
    /// Never changes the balance. A `BalanceCheck` record is appended for
    /// audit completeness; if that fails the balance is not reported.
    pub fn check_balance(&mut self, session: &mut AuthSession) -> Result<Money, EngineError> {
        let account = self.ensure_authenticated(session)?;
        let ledger = &mut self.ledger;

        let balance = self
            .accounts
            .update(account, |state| -> Result<Money, EngineError> {
                if state.locked {
                    return Err(EngineError::Unauthenticated);
                }
                ledger
                    .append(LedgerEntry::new(
                        account,
                        TransactionKind::BalanceCheck,
                        Money::ZERO,
                        state.balance,
                    ))
                    .map_err(EngineError::AuditFailure)?;
                Ok(state.balance)
            })
            .map_err(EngineError::from)?
            .map_err(|err| Self::lock_out_on(session, err))
            .inspect_err(|err| error!(account, error = %err, "balance check not recorded"))?;

        info!(account, %balance, "balance checked");
        Ok(balance)
    }

    /// Run `f` over the session's ledger history, oldest first
    ///
    /// Subject to the same lockout check as the other operations.
    pub fn history<R>(
        &self,
        session: &mut AuthSession,
        f: impl FnOnce(History<'_>) -> R,
    ) -> Result<R, EngineError> {
        let account = self.ensure_authenticated(session)?;
        Ok(self.ledger.with_history(account, f))
    }

    pub fn accounts(&self) -> &S {
        &self.accounts
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn limits(&self) -> &TransactionLimits {
        &self.limits
    }

    /// Verify the session and return its account
    ///
    /// A session whose account has since been locked is moved to
    /// `LockedOut` and rejected. This is only a fast path: the mutating
    /// operations check the lock again inside the account's critical
    /// section.
    fn ensure_authenticated(&self, session: &mut AuthSession) -> Result<AccountId, EngineError> {
        if !session.is_authenticated() {
            return Err(EngineError::Unauthenticated);
        }

        let account = session.account();
        if self.accounts.is_locked(account) {
            warn!(account, "session rejected: account locked");
            session.lock_out();
            return Err(EngineError::Unauthenticated);
        }

        Ok(account)
    }

    fn check_amount(&self, account: AccountId, amount: Money) -> Result<(), EngineError> {
        self.limits.check(amount).map_err(|err| {
            warn!(account, %amount, error = %err, "amount rejected");
            EngineError::from(err)
        })
    }

    /// Move the session to `LockedOut` if `err` came from a locked account
    fn lock_out_on(session: &mut AuthSession, err: EngineError) -> EngineError {
        if err == EngineError::Unauthenticated {
            warn!(account = session.account(), "account locked during operation");
            session.lock_out();
        }
        err
    }

    /// Apply `delta` and append its record as one unit
    fn commit(
        &mut self,
        session: &mut AuthSession,
        delta: Delta,
        kind: TransactionKind,
        amount: Money,
    ) -> Result<Money, EngineError> {
        let account = session.account();
        let ledger = &mut self.ledger;

        self.accounts
            .apply_delta_with(account, delta, |balance| {
                ledger
                    .append(LedgerEntry::new(account, kind, amount, balance))
                    .map(drop)
                    .map_err(EngineError::AuditFailure)
            })
            .map_err(|err| Self::lock_out_on(session, err))
            .inspect_err(|err| match err {
                EngineError::AuditFailure(_) => {
                    error!(account, %kind, error = %err, "operation rolled back")
                }
                _ => warn!(account, %kind, error = %err, "operation rejected"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::LedgerSink;
    use crate::types::pin::SALT_LEN;
    use crate::types::{Account, LedgerError, PinHash, SessionState, StoreError, TransactionRecord};
    use rstest::{fixture, rstest};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    const PIN: &str = "1234";

    fn money(minor_units: u64) -> Money {
        Money::from_minor_units(minor_units)
    }

    fn engine_with_ledger(balance: u64, ledger: TransactionLedger) -> TransactionEngine {
        let accounts = InMemoryAccountStore::with_accounts([Account::new(
            1,
            money(balance),
            PinHash::with_salt(PIN, [5u8; SALT_LEN]),
        )]);
        TransactionEngine::new(
            accounts,
            ledger,
            Authenticator::default(),
            TransactionLimits::default(),
        )
    }

    #[fixture]
    fn engine() -> TransactionEngine {
        engine_with_ledger(10_000, TransactionLedger::new())
    }

    fn kinds(engine: &TransactionEngine) -> Vec<TransactionKind> {
        engine.ledger().records().iter().map(|r| r.kind).collect()
    }

    /// Sink that starts failing once `fail` is set
    struct SwitchableSink {
        fail: Arc<AtomicBool>,
    }

    impl LedgerSink for SwitchableSink {
        fn write(&mut self, record: &TransactionRecord) -> Result<(), LedgerError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(LedgerError::sink(record.sequence, "disk full"))
            } else {
                Ok(())
            }
        }
    }

    #[rstest]
    fn test_deposit_withdraw_scenario(mut engine: TransactionEngine) {
        let mut session = engine.login(1, PIN).unwrap();

        assert_eq!(engine.deposit(&mut session, money(5_000)), Ok(money(15_000)));
        assert_eq!(kinds(&engine), vec![TransactionKind::Deposit]);

        let overdraft = engine.withdraw(&mut session, money(20_000));
        assert_eq!(
            overdraft,
            Err(EngineError::InsufficientFunds(StoreError::insufficient_funds(
                1,
                money(15_000),
                money(20_000)
            )))
        );
        assert_eq!(engine.accounts().balance(1), Ok(money(15_000)));
        assert_eq!(engine.ledger().len(), 1);

        assert_eq!(engine.withdraw(&mut session, money(15_000)), Ok(Money::ZERO));
        assert_eq!(
            kinds(&engine),
            vec![TransactionKind::Deposit, TransactionKind::Withdrawal]
        );

        let last = &engine.ledger().records()[1];
        assert_eq!(last.amount, money(15_000));
        assert_eq!(last.resulting_balance, Money::ZERO);
    }

    #[rstest]
    fn test_check_balance_never_mutates(mut engine: TransactionEngine) {
        let mut session = engine.login(1, PIN).unwrap();

        for _ in 0..5 {
            assert_eq!(engine.check_balance(&mut session), Ok(money(10_000)));
        }

        assert_eq!(engine.accounts().balance(1), Ok(money(10_000)));
        assert_eq!(engine.ledger().len(), 5);
        assert!(engine
            .ledger()
            .records()
            .iter()
            .all(|r| r.kind == TransactionKind::BalanceCheck && r.amount == Money::ZERO));
    }

    #[rstest]
    #[case::zero(0, AmountError::Zero)]
    #[case::above_maximum(
        1_000_001,
        AmountError::AboveMaximum { amount: money(1_000_001), maximum: TransactionLimits::DEFAULT_MAXIMUM }
    )]
    fn test_invalid_amounts_rejected(
        mut engine: TransactionEngine,
        #[case] amount: u64,
        #[case] expected: AmountError,
    ) {
        let mut session = engine.login(1, PIN).unwrap();

        assert_eq!(
            engine.deposit(&mut session, money(amount)),
            Err(EngineError::InvalidAmount(expected.clone()))
        );
        assert_eq!(
            engine.withdraw(&mut session, money(amount)),
            Err(EngineError::InvalidAmount(expected))
        );
        assert!(engine.ledger().is_empty());
    }

    #[test]
    fn test_below_minimum_rejected() {
        let limits = TransactionLimits::new(money(2_000), money(50_000));
        assert_eq!(
            limits.check(money(1_999)),
            Err(AmountError::BelowMinimum {
                amount: money(1_999),
                minimum: money(2_000)
            })
        );
        assert_eq!(limits.check(money(2_000)), Ok(()));
        assert_eq!(limits.check(money(50_000)), Ok(()));
    }

    #[rstest]
    fn test_operations_require_authentication(mut engine: TransactionEngine) {
        let mut session = AuthSession::unauthenticated(1, 3);

        assert_eq!(
            engine.deposit(&mut session, money(100)),
            Err(EngineError::Unauthenticated)
        );
        assert_eq!(
            engine.withdraw(&mut session, money(100)),
            Err(EngineError::Unauthenticated)
        );
        assert_eq!(
            engine.check_balance(&mut session),
            Err(EngineError::Unauthenticated)
        );
        assert_eq!(
            engine.history(&mut session, |h| h.count()),
            Err(EngineError::Unauthenticated)
        );
        assert!(engine.ledger().is_empty());
    }

    #[rstest]
    fn test_logged_out_session_rejected(mut engine: TransactionEngine) {
        let mut session = engine.login(1, PIN).unwrap();
        engine.logout(&mut session);

        assert_eq!(session.state(), SessionState::LoggedOut);
        assert_eq!(
            engine.deposit(&mut session, money(100)),
            Err(EngineError::Unauthenticated)
        );
    }

    #[rstest]
    fn test_session_on_locked_account_is_locked_out(mut engine: TransactionEngine) {
        let mut session = engine.login(1, PIN).unwrap();
        for _ in 0..3 {
            let _ = engine.login(1, "0000");
        }

        assert_eq!(
            engine.check_balance(&mut session),
            Err(EngineError::Unauthenticated)
        );
        assert_eq!(session.state(), SessionState::LockedOut);
    }

    #[rstest]
    fn test_history_on_locked_account_is_locked_out(mut engine: TransactionEngine) {
        let mut session = engine.login(1, PIN).unwrap();
        for _ in 0..3 {
            let _ = engine.login(1, "0000");
        }

        assert_eq!(
            engine.history(&mut session, |h| h.count()),
            Err(EngineError::Unauthenticated)
        );
        assert_eq!(session.state(), SessionState::LockedOut);
    }

    /// Store whose lock query never sees a lock, as when another session
    /// locks the account between the fast-path check and the commit
    #[derive(Default)]
    struct StaleLockView(InMemoryAccountStore);

    impl AccountStore for StaleLockView {
        fn insert(&mut self, account: Account) {
            self.0.insert(account)
        }

        fn account(&self, id: AccountId) -> Option<Account> {
            self.0.account(id)
        }

        fn balance(&self, id: AccountId) -> Result<Money, StoreError> {
            self.0.balance(id)
        }

        fn is_locked(&self, _id: AccountId) -> bool {
            false
        }

        fn update<F, R>(&mut self, id: AccountId, f: F) -> Result<R, StoreError>
        where
            F: FnOnce(&mut Account) -> R,
        {
            self.0.update(id, f)
        }
    }

    #[rstest]
    #[case::deposit(TransactionKind::Deposit)]
    #[case::withdrawal(TransactionKind::Withdrawal)]
    #[case::balance_check(TransactionKind::BalanceCheck)]
    fn test_lock_rechecked_inside_critical_section(#[case] kind: TransactionKind) {
        let mut accounts = StaleLockView::default();
        accounts.insert(Account::new(1, money(10_000), PinHash::with_salt(PIN, [5u8; SALT_LEN])));
        let mut engine = TransactionEngine::new(
            accounts,
            TransactionLedger::new(),
            Authenticator::default(),
            TransactionLimits::default(),
        );

        let mut session = engine.login(1, PIN).unwrap();
        for _ in 0..3 {
            let _ = engine.login(1, "0000");
        }
        let records_before = engine.ledger().len();

        let result = match kind {
            TransactionKind::Deposit => engine.deposit(&mut session, money(100)),
            TransactionKind::Withdrawal => engine.withdraw(&mut session, money(100)),
            _ => engine.check_balance(&mut session),
        };

        assert_eq!(result, Err(EngineError::Unauthenticated));
        assert_eq!(session.state(), SessionState::LockedOut);
        assert_eq!(engine.accounts().balance(1), Ok(money(10_000)));
        assert_eq!(engine.ledger().len(), records_before);
    }

    #[rstest]
    fn test_login_lockout_through_engine(mut engine: TransactionEngine) {
        for _ in 0..2 {
            assert!(matches!(
                engine.login(1, "9999"),
                Err(AuthError::InvalidPin { .. })
            ));
        }
        assert_eq!(engine.login(1, "9999"), Err(AuthError::locked_out(1)));
        assert_eq!(engine.login(1, PIN), Err(AuthError::locked_out(1)));

        engine.reset_lockout(1).unwrap();
        assert!(engine.login(1, PIN).is_ok());
    }

    #[test]
    fn test_audit_failure_rolls_back_deposit() {
        let fail = Arc::new(AtomicBool::new(false));
        let ledger = TransactionLedger::new().with_sink(SwitchableSink { fail: fail.clone() });
        let mut engine = engine_with_ledger(10_000, ledger);
        let mut session = engine.login(1, PIN).unwrap();

        fail.store(true, Ordering::SeqCst);

        let result = engine.deposit(&mut session, money(5_000));
        assert!(matches!(result, Err(EngineError::AuditFailure(_))));
        assert!(result.unwrap_err().is_terminal());
        assert_eq!(engine.accounts().balance(1), Ok(money(10_000)));
        assert!(engine.ledger().is_empty());

        let result = engine.withdraw(&mut session, money(5_000));
        assert!(matches!(result, Err(EngineError::AuditFailure(_))));
        assert_eq!(engine.accounts().balance(1), Ok(money(10_000)));

        assert!(matches!(
            engine.check_balance(&mut session),
            Err(EngineError::AuditFailure(_))
        ));
    }

    #[rstest]
    fn test_history_lists_session_account(mut engine: TransactionEngine) {
        let mut session = engine.login(1, PIN).unwrap();
        engine.deposit(&mut session, money(100)).unwrap();
        engine.withdraw(&mut session, money(50)).unwrap();
        engine.check_balance(&mut session).unwrap();

        let balances = engine
            .history(&mut session, |history| {
                history
                    .map(|record| record.resulting_balance)
                    .collect::<Vec<_>>()
            })
            .unwrap();

        assert_eq!(balances, vec![money(10_100), money(10_050), money(10_050)]);
    }

    #[test]
    fn test_deposit_overflow() {
        let mut engine = engine_with_ledger(u64::MAX - 10, TransactionLedger::new());
        let mut session = engine.login(1, PIN).unwrap();

        assert_eq!(
            engine.deposit(&mut session, money(100)),
            Err(EngineError::Overflow { account: 1 })
        );
        assert_eq!(engine.accounts().balance(1), Ok(money(u64::MAX - 10)));
    }
}
