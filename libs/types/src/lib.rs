//! # Bank RPC Types Library
//!
//! Shared type system for the bank RPC protocol: the stable integer codes
//! both ends agree on, identifiers, monetary amounts and the account
//! projection the server sends back.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: Amounts are `rust_decimal` values, never `f64`
//! - **Type Safety**: Correlation ids, account numbers and amounts are distinct types
//! - **Clear Boundaries**: Rounding to cents happens in the receiver, never in the wire layer
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → libs/network → services/
//!     ↑            ↓             ↓             ↓
//! Pure Data    Wire Layout    Datagrams    Dispatch/CLI
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Currency, Money, Opcode, StatusCode};
//!
//! let amount = Money::parse("50.005").unwrap().round_cents();
//! assert_eq!(amount.to_string(), "50.01");
//! assert_eq!(Opcode::try_from(2).unwrap(), Opcode::Deposit);
//! assert_eq!(StatusCode::NotFound.code(), 404);
//! assert_eq!("NZD".parse::<Currency>().unwrap(), Currency::Nzd);
//! ```

pub mod account;
pub mod common;
pub mod protocol;

pub use account::{AccountAction, AccountSnapshot, Currency, ParseLabelError};
pub use common::errors::{DomainFailure, MoneyError};
pub use common::identifiers::{AccountNumber, AccountNumberError, CorrelationId};
pub use common::money::Money;
pub use protocol::constants::*;
