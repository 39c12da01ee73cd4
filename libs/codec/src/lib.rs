//! # Bank RPC Codec
//!
//! ## Purpose
//!
//! The "rules" layer shared by client and server: how fields are laid out
//! in a datagram, how a request envelope is framed, which fields each
//! opcode carries and how replies are shaped.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/network → services/
//!     ↑           ↓            ↓
//! Pure Data   Wire Layout   Datagrams
//! ```
//!
//! ## What This Crate Contains
//! - [`WireWriter`] / [`WireReader`]: padded, length-prefixed field encoding
//! - [`decode_field`]: the functional `(buffer, cursor) -> (value, next)` primitive
//! - [`Envelope`]: correlation id + opcode + fields
//! - [`Request`]: the per-opcode field schema
//! - [`Reply`]: status-first reply encoding
//! - [`ProtocolError`]: framing errors with diagnostic context
//!
//! ## What This Crate Does NOT Contain
//! - Sockets, timeouts or retries (belongs in network/)
//! - Account rules or currency conversion (belongs in the server)
//!
//! ## Quick Start
//!
//! ```rust
//! use codec::{decode_field, encode_string};
//!
//! let bytes = encode_string("NZD");
//! assert_eq!(bytes.len(), 8);
//! let (value, next) = decode_field(&bytes, 0).unwrap();
//! assert_eq!((value, next), ("NZD", 8));
//! ```

pub mod builder;
pub mod envelope;
pub mod error;
pub mod parser;
pub mod reply;
pub mod request;

pub use builder::{encode_string, encoded_field_len, padding_for, WireWriter};
pub use envelope::{parse_header, Envelope, EnvelopeHeader};
pub use error::{ProtocolError, ProtocolResult};
pub use parser::{decode_f64, decode_field, decode_i32, WireReader};
pub use reply::Reply;
pub use request::{BalanceQuery, CloseAccount, FundsMovement, OpenAccount, Request, Transfer};
