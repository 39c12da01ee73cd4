//! Error types for monetary arithmetic and domain failures
//!
//! `MoneyError` covers parsing and overflow of amounts. `DomainFailure` is
//! the narrow failure vocabulary the account service hands back to the
//! dispatcher; each variant maps onto exactly one wire status code.

use crate::protocol::constants::StatusCode;
use thiserror::Error;

/// Errors that can occur while parsing or computing monetary amounts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MoneyError {
    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected numeric format")]
    InvalidDecimal { input: String },

    /// Arithmetic result does not fit the decimal representation
    #[error("Overflow while computing {operation}")]
    Overflow { operation: &'static str },

    /// Exchange rate of zero or below
    #[error("Exchange rate must be positive, got {rate}")]
    InvalidRate { rate: String },
}

/// Typed failure returned by the account service
///
/// Raised after the existence/authorization checks and before any
/// mutation, so a failure never leaves partial state behind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainFailure {
    #[error("account not found")]
    NotFound,

    #[error("unauthorized: name or password mismatch")]
    Unauthorized,

    #[error("insufficient funds")]
    Insufficient,
}

impl DomainFailure {
    /// Wire status code carried by a failure reply
    pub fn status(self) -> StatusCode {
        match self {
            DomainFailure::NotFound => StatusCode::NotFound,
            DomainFailure::Unauthorized => StatusCode::Unauthorized,
            DomainFailure::Insufficient => StatusCode::Insufficient,
        }
    }

    /// Inverse of [`DomainFailure::status`]; `None` for `OK`
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::Ok => None,
            StatusCode::NotFound => Some(DomainFailure::NotFound),
            StatusCode::Unauthorized => Some(DomainFailure::Unauthorized),
            StatusCode::Insufficient => Some(DomainFailure::Insufficient),
        }
    }
}
