//! Account projection shared by server replies and client notifications
//!
//! The server owns account records; the protocol only ever sees this
//! read-only projection (number, holder, currency, balance, last action).
//! The password never leaves the account service.

use crate::common::identifiers::AccountNumber;
use crate::common::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error for unknown currency codes and action labels
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseLabelError {
    #[error("Unknown currency '{0}': supported currencies are SGD, NZD, USD")]
    Currency(String),

    #[error("Unknown account action '{0}'")]
    Action(String),
}

/// Currencies the bank quotes exchange rates for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Sgd,
    Nzd,
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Sgd, Currency::Nzd, Currency::Usd];

    /// ISO code as carried on the wire
    pub fn code(self) -> &'static str {
        match self {
            Currency::Sgd => "SGD",
            Currency::Nzd => "NZD",
            Currency::Usd => "USD",
        }
    }
}

impl FromStr for Currency {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SGD" => Ok(Currency::Sgd),
            "NZD" => Ok(Currency::Nzd),
            "USD" => Ok(Currency::Usd),
            _ => Err(ParseLabelError::Currency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Most recent action performed on an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountAction {
    Created,
    Deposit,
    Withdrawal,
    TransferOut,
    TransferIn,
    BalanceQuery,
    Closed,
}

impl AccountAction {
    /// Label carried on the wire and shown to monitoring clients
    pub fn label(self) -> &'static str {
        match self {
            AccountAction::Created => "Account Creation",
            AccountAction::Deposit => "Deposit Funds",
            AccountAction::Withdrawal => "Withdraw Funds",
            AccountAction::TransferOut => "Transfer Funds Out",
            AccountAction::TransferIn => "Transfer Funds In",
            AccountAction::BalanceQuery => "Check Balance",
            AccountAction::Closed => "Account Closure",
        }
    }
}

impl FromStr for AccountAction {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ACTIONS: [AccountAction; 7] = [
            AccountAction::Created,
            AccountAction::Deposit,
            AccountAction::Withdrawal,
            AccountAction::TransferOut,
            AccountAction::TransferIn,
            AccountAction::BalanceQuery,
            AccountAction::Closed,
        ];
        ACTIONS
            .into_iter()
            .find(|action| action.label() == s)
            .ok_or_else(|| ParseLabelError::Action(s.to_string()))
    }
}

impl fmt::Display for AccountAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialized view of one account, as returned by every successful account operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub number: AccountNumber,
    pub holder: String,
    pub currency: Currency,
    pub balance: Money,
    pub action: AccountAction,
}
