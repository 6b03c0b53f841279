//! Main menu choices

use std::str::FromStr;
use thiserror::Error;

pub const MENU: &str = "\n--- ATM Menu ---\n\
1. Check Balance\n\
2. Deposit Money\n\
3. Withdraw Money\n\
4. Transaction History\n\
5. Exit\n";

pub const CHOICE_PROMPT: &str = "Enter your choice (1-5): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CheckBalance,
    Deposit,
    Withdraw,
    History,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid menu choice '{0}'")]
pub struct InvalidChoice(pub String);

impl FromStr for MenuChoice {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::CheckBalance),
            "2" => Ok(MenuChoice::Deposit),
            "3" => Ok(MenuChoice::Withdraw),
            "4" => Ok(MenuChoice::History),
            "5" => Ok(MenuChoice::Exit),
            other => Err(InvalidChoice(other.to_string())),
        }
    }
}
