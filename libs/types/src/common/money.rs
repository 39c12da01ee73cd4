//! Monetary amounts for precise account arithmetic
//!
//! Amounts travel on the wire as decimal strings and are held as
//! `rust_decimal::Decimal`, so "1000.00" is exactly one thousand and never a
//! nearby binary float.
//!
//! ## Design Principles
//!
//! - **No Precision Loss**: parsing is exact, no intermediate `f64`
//! - **Receiver Rounds**: the wire layer never rounds; the account service
//!   calls [`Money::round_cents`] after any currency conversion
//! - **Half-Up**: ties round away from zero (`0.005 -> 0.01`)

use crate::common::errors::MoneyError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits kept on every balance
pub const MONETARY_DECIMAL_PLACES: u32 = 2;

/// Monetary amount in some (external) currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a decimal string exactly, without rounding
    ///
    /// This is the method for amounts arriving from the wire or from user input.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|_| MoneyError::InvalidDecimal {
                input: s.to_string(),
            })
    }

    pub const fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Round half-up to [`MONETARY_DECIMAL_PLACES`]
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(MONETARY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Convert an amount quoted at `from_rate` into a currency quoted at `to_rate`
    ///
    /// `amount / from_rate * to_rate`, unrounded. Callers round afterwards.
    pub fn convert(self, from_rate: Decimal, to_rate: Decimal) -> Result<Self, MoneyError> {
        if from_rate <= Decimal::ZERO {
            return Err(MoneyError::InvalidRate {
                rate: from_rate.to_string(),
            });
        }
        if to_rate <= Decimal::ZERO {
            return Err(MoneyError::InvalidRate {
                rate: to_rate.to_string(),
            });
        }
        self.0
            .checked_div(from_rate)
            .and_then(|base| base.checked_mul(to_rate))
            .map(Self)
            .ok_or(MoneyError::Overflow {
                operation: "currency conversion",
            })
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Always renders two fractional digits, the form balances take on the wire
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round_cents().0)
    }
}
