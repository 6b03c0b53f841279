//! Interactive session driver
//!
//! Runs the PIN prompt and the menu loop over any `BufRead`/`Write` pair, so
//! the same code serves the terminal and scripted tests. All state changes go
//! through the `TransactionEngine`; the driver only parses input and prints
//! results.

use super::menu::{MenuChoice, CHOICE_PROMPT, MENU};
use crate::core::{AccountStore, AuditLog, TransactionEngine};
use crate::types::{
    AccountId, AmountError, AuthError, AuthSession, EngineError, Money, TransactionRecord,
};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, error};
use zeroize::Zeroizing;

const PIN_PROMPT: &str = "Please enter your PIN: ";
const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user chose Exit or input ended at the menu
    Quit,
    /// The account was locked, either during login or mid-session
    LockedOut,
    /// Input ended before authentication
    Cancelled,
}

impl SessionOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            SessionOutcome::Quit => 0,
            SessionOutcome::LockedOut | SessionOutcome::Cancelled => 1,
        }
    }
}

/// Unrecoverable driver failures
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Which side of the menu an amount prompt belongs to
#[derive(Debug, Clone, Copy)]
enum Operation {
    Deposit,
    Withdraw,
}

impl Operation {
    fn prompt(self) -> &'static str {
        match self {
            Operation::Deposit => "Enter amount to deposit: $",
            Operation::Withdraw => "Enter amount to withdraw: $",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Operation::Deposit => "deposit",
            Operation::Withdraw => "withdrawal",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Operation::Deposit => "deposited",
            Operation::Withdraw => "withdrawn",
        }
    }
}

/// Drives one ATM session against an engine
pub struct SessionDriver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> SessionDriver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        SessionDriver { input, output }
    }

    /// Authenticate and run the menu until the user quits
    ///
    /// # Errors
    ///
    /// Returns a `DriverError` for I/O failures, an unknown account and any
    /// terminal engine error such as an audit failure. Recoverable errors
    /// (invalid PIN, invalid amount, insufficient funds) are reported to the
    /// user and the session continues.
    pub fn run<S, L>(
        &mut self,
        engine: &mut TransactionEngine<S, L>,
        account: AccountId,
    ) -> Result<SessionOutcome, DriverError>
    where
        S: AccountStore,
        L: AuditLog,
    {
        let mut session = match self.authenticate(engine, account)? {
            Ok(session) => session,
            Err(outcome) => return Ok(outcome),
        };

        let outcome = self.menu_loop(engine, &mut session);
        engine.logout(&mut session);
        outcome
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// PIN prompt loop
    ///
    /// The inner `Err` carries the outcome for a session that never got
    /// authenticated.
    fn authenticate<S, L>(
        &mut self,
        engine: &mut TransactionEngine<S, L>,
        account: AccountId,
    ) -> Result<Result<AuthSession, SessionOutcome>, DriverError>
    where
        S: AccountStore,
        L: AuditLog,
    {
        loop {
            self.prompt(PIN_PROMPT)?;
            let Some(pin) = self.read_line()? else {
                writeln!(self.output, "\nOperation cancelled.")?;
                return Ok(Err(SessionOutcome::Cancelled));
            };

            match engine.login(account, pin.trim()) {
                Ok(session) => {
                    writeln!(self.output, "Authentication successful!")?;
                    return Ok(Ok(session));
                }
                Err(err @ AuthError::InvalidPin { .. }) => {
                    writeln!(self.output, "{}.", err)?;
                }
                Err(AuthError::LockedOut { .. }) => {
                    writeln!(self.output, "Too many invalid attempts. Account locked.")?;
                    return Ok(Err(SessionOutcome::LockedOut));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn menu_loop<S, L>(
        &mut self,
        engine: &mut TransactionEngine<S, L>,
        session: &mut AuthSession,
    ) -> Result<SessionOutcome, DriverError>
    where
        S: AccountStore,
        L: AuditLog,
    {
        loop {
            write!(self.output, "{}", MENU)?;
            self.prompt(CHOICE_PROMPT)?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output, "\nOperation cancelled.")?;
                return Ok(SessionOutcome::Quit);
            };

            let choice = match line.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(err) => {
                    debug!(error = %err, "menu input rejected");
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    continue;
                }
            };

            let handled = match choice {
                MenuChoice::CheckBalance => self.show_balance(engine, session),
                MenuChoice::Deposit => self.transact(engine, session, Operation::Deposit),
                MenuChoice::Withdraw => self.transact(engine, session, Operation::Withdraw),
                MenuChoice::History => self.show_history(engine, session),
                MenuChoice::Exit => {
                    writeln!(self.output, "Thank you for using the ATM. Goodbye!")?;
                    return Ok(SessionOutcome::Quit);
                }
            };

            let ended = match handled {
                Ok(ended) => ended,
                Err(DriverError::Engine(err)) => self.report(err, session, choice)?,
                Err(err) => return Err(err),
            };
            if let Some(outcome) = ended {
                return Ok(outcome);
            }
        }
    }

    fn show_balance<S, L>(
        &mut self,
        engine: &mut TransactionEngine<S, L>,
        session: &mut AuthSession,
    ) -> Result<Option<SessionOutcome>, DriverError>
    where
        S: AccountStore,
        L: AuditLog,
    {
        let balance = engine.check_balance(session)?;
        writeln!(self.output, "Your current balance is: ${}", balance)?;
        Ok(None)
    }

    fn transact<S, L>(
        &mut self,
        engine: &mut TransactionEngine<S, L>,
        session: &mut AuthSession,
        operation: Operation,
    ) -> Result<Option<SessionOutcome>, DriverError>
    where
        S: AccountStore,
        L: AuditLog,
    {
        self.prompt(operation.prompt())?;
        let Some(line) = self.read_line()? else {
            writeln!(self.output, "\nOperation cancelled.")?;
            return Ok(Some(SessionOutcome::Quit));
        };

        let amount = line.trim().parse::<Money>().map_err(EngineError::from)?;
        let balance = match operation {
            Operation::Deposit => engine.deposit(session, amount)?,
            Operation::Withdraw => engine.withdraw(session, amount)?,
        };

        writeln!(
            self.output,
            "${} {} successfully.",
            amount,
            operation.past_tense()
        )?;
        writeln!(self.output, "New balance: ${}", balance)?;
        Ok(None)
    }

    fn show_history<S, L>(
        &mut self,
        engine: &mut TransactionEngine<S, L>,
        session: &mut AuthSession,
    ) -> Result<Option<SessionOutcome>, DriverError>
    where
        S: AccountStore,
        L: AuditLog,
    {
        let lines = engine.history(session, |history| {
            history.map(format_record).collect::<Vec<_>>()
        })?;

        if lines.is_empty() {
            writeln!(self.output, "No transactions found.")?;
            return Ok(None);
        }

        writeln!(self.output, "\n--- Transaction History ---")?;
        for line in lines {
            writeln!(self.output, "{}", line)?;
        }
        Ok(None)
    }

    /// Tell the user why an operation was rejected
    ///
    /// Returns `Some` when the session cannot continue.
    fn report(
        &mut self,
        err: EngineError,
        session: &AuthSession,
        choice: MenuChoice,
    ) -> Result<Option<SessionOutcome>, DriverError> {
        if err.is_terminal() {
            error!(account = session.account(), error = %err, "session aborted");
            return Err(err.into());
        }

        let noun = match choice {
            MenuChoice::Withdraw => Operation::Withdraw.noun(),
            _ => Operation::Deposit.noun(),
        };

        match err {
            EngineError::Unauthenticated => {
                writeln!(self.output, "Session ended. Account locked.")?;
                return Ok(Some(SessionOutcome::LockedOut));
            }
            EngineError::InvalidAmount(AmountError::Malformed { .. }) => {
                writeln!(self.output, "Invalid input. Please enter a numeric amount.")?;
            }
            EngineError::InvalidAmount(AmountError::Negative { .. } | AmountError::Zero) => {
                writeln!(
                    self.output,
                    "Invalid {} amount. Please enter a positive value.",
                    noun
                )?;
            }
            EngineError::InsufficientFunds(_) => {
                writeln!(self.output, "Insufficient funds!")?;
            }
            other => {
                writeln!(self.output, "{}.", other)?;
            }
        }
        Ok(None)
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{}", text)?;
        self.output.flush()
    }

    /// Read one line; `None` at end of input
    ///
    /// The buffer is wiped on drop since it may hold a PIN.
    fn read_line(&mut self) -> io::Result<Option<Zeroizing<String>>> {
        let mut line = Zeroizing::new(String::new());
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// One history line: `timestamp | Type: Kind | Amount: $x | Balance: $y`
fn format_record(record: &TransactionRecord) -> String {
    format!(
        "{} | Type: {} | Amount: ${} | Balance: ${}",
        record.timestamp.format(HISTORY_TIMESTAMP_FORMAT),
        record.kind,
        record.amount,
        record.resulting_balance
    )
}
