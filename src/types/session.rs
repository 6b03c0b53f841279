//! Authentication sessions
//!
//! An authenticated `AuthSession` can only be minted by the authenticator,
//! so holding one is proof of a successful PIN check. Once logged out or
//! locked out a session never becomes authenticated again.

use super::transaction::AccountId;

/// Session lifecycle
///
/// `Unauthenticated -> Authenticated -> LoggedOut | LockedOut`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    LoggedOut,
    LockedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    account: AccountId,
    state: SessionState,
    attempts_remaining: u32,
}

impl AuthSession {
    /// A session that has not passed a PIN check
    pub fn unauthenticated(account: AccountId, attempts_remaining: u32) -> Self {
        AuthSession {
            account,
            state: SessionState::Unauthenticated,
            attempts_remaining,
        }
    }

    pub(crate) fn authenticated(account: AccountId, attempts_remaining: u32) -> Self {
        AuthSession {
            account,
            state: SessionState::Authenticated,
            attempts_remaining,
        }
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// End an authenticated session
    pub fn logout(&mut self) {
        if self.state == SessionState::Authenticated {
            self.state = SessionState::LoggedOut;
        }
    }

    /// Terminate the session because its account is locked
    pub(crate) fn lock_out(&mut self) {
        self.state = SessionState::LockedOut;
        self.attempts_remaining = 0;
    }
}
