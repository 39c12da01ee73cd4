//! Protocol layer constants
//!
//! Wire-stable integer codes and sizes. Encoding logic lives in codec.

pub mod constants;

pub use constants::{CodeError, Opcode, StatusCode};
