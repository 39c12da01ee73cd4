//! # Identifiers - Correlation Ids and Account Numbers
//!
//! ## Correlation ids
//!
//! A [`CorrelationId`] names one logical invocation. The client generates it
//! once and reuses the exact same 16 bytes on every retransmission; the
//! server keys its reply cache on it. It is opaque to the server: any 16
//! bytes are accepted, which keeps older alphanumeric-id clients working.
//!
//! ## Account numbers
//!
//! [`AccountNumber`] wraps the 10-digit number the account service hands out.
//! On the wire it travels as a decimal string field.

use crate::protocol::constants::CORRELATION_ID_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Opaque per-invocation token, fixed at [`CORRELATION_ID_LEN`] bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId([u8; CORRELATION_ID_LEN]);

impl CorrelationId {
    /// Fresh random id for a new logical invocation
    pub fn generate() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    pub const fn from_bytes(bytes: [u8; CORRELATION_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build from a slice of exactly [`CORRELATION_ID_LEN`] bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; CORRELATION_ID_LEN]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; CORRELATION_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_bytes(self.0).simple())
    }
}

impl fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CorrelationId({})", self)
    }
}

/// Errors for account number parsing
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountNumberError {
    #[error("Invalid account number '{input}': expected a decimal integer")]
    NotNumeric { input: String },

    #[error("Account number {value} is outside [{min}, {max}]")]
    OutOfRange { value: u64, min: u32, max: u32 },
}

/// Account number allocated by the account service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountNumber(u32);

impl AccountNumber {
    /// Smallest number the allocator hands out (first 10-digit value)
    pub const MIN: u32 = 1_000_000_000;

    /// Upper bound kept inside `i32` for compatibility with 4-byte signed peers
    pub const MAX: u32 = i32::MAX as u32;

    pub fn new(value: u32) -> Result<Self, AccountNumberError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(AccountNumberError::OutOfRange {
                value: value as u64,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl FromStr for AccountNumber {
    type Err = AccountNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s.trim().parse().map_err(|_| AccountNumberError::NotNumeric {
            input: s.to_string(),
        })?;
        let value = u32::try_from(value).map_err(|_| AccountNumberError::OutOfRange {
            value,
            min: Self::MIN,
            max: Self::MAX,
        })?;
        Self::new(value)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = CorrelationId::generate();
        let b = CorrelationId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_bytes().len(), CORRELATION_ID_LEN);
    }

    #[test]
    fn test_correlation_id_from_slice_requires_exact_length() {
        assert!(CorrelationId::from_slice(&[0u8; 15]).is_none());
        assert!(CorrelationId::from_slice(&[0u8; 17]).is_none());
        let id = CorrelationId::from_slice(b"abcdefghijklmnop").unwrap();
        assert_eq!(id.as_bytes(), b"abcdefghijklmnop");
    }

    #[test]
    fn test_account_number_parsing() {
        let number: AccountNumber = "1234567890".parse().unwrap();
        assert_eq!(number.value(), 1_234_567_890);
        assert_eq!(number.to_string(), "1234567890");

        assert!(matches!(
            "12ab".parse::<AccountNumber>(),
            Err(AccountNumberError::NotNumeric { .. })
        ));
        assert!(matches!(
            "999".parse::<AccountNumber>(),
            Err(AccountNumberError::OutOfRange { .. })
        ));
        assert!(matches!(
            "99999999999".parse::<AccountNumber>(),
            Err(AccountNumberError::OutOfRange { .. })
        ));
    }
}
