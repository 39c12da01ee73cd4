//! Protocol constants and basic types
//!
//! These are fundamental codes that must stay stable across client and
//! server builds. Both ends share the per-opcode field schema out of band,
//! so changing any value here is a wire-breaking change.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use thiserror::Error;

/// Length of the correlation id that starts every request datagram
pub const CORRELATION_ID_LEN: usize = 16;

/// Width of the big-endian opcode that follows the correlation id
pub const OPCODE_LEN: usize = 4;

/// Offset of the first request field
pub const ENVELOPE_HEADER_LEN: usize = CORRELATION_ID_LEN + OPCODE_LEN;

/// Every string field is padded to a multiple of this many bytes
pub const WIRE_ALIGNMENT: usize = 4;

/// Filler byte for string padding (ASCII '_')
pub const PADDING_BYTE: u8 = b'_';

/// Largest payload a single UDP datagram can carry over IPv4
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Receive buffer size both ends use unless configured otherwise
pub const DEFAULT_BUFFER_SIZE: usize = 1_000;

/// Well-known server port
pub const DEFAULT_SERVER_PORT: u16 = 6789;

/// Errors converting raw integers into protocol codes
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodeError {
    #[error("Unknown opcode {0}")]
    UnknownOpcode(i32),

    #[error("Unknown status code {0}")]
    UnknownStatus(i32),
}

/// Operation selector carried in every request envelope
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// Server-internal sentinel marking a reply served from the reply cache
    CachedReply = 0,
    CreateAccount = 1,
    Deposit = 2,
    Withdraw = 3,
    CloseAccount = 4,
    Transfer = 5,
    StartMonitoring = 6,
    BalanceQuery = 7,
    StopMonitoring = 8,
}

impl Opcode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Opcodes that manage the observer registry rather than accounts
    pub fn is_monitoring_control(self) -> bool {
        matches!(self, Opcode::StartMonitoring | Opcode::StopMonitoring)
    }

    /// Whether a client may put this opcode on the wire
    pub fn is_client_visible(self) -> bool {
        self != Opcode::CachedReply
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::CachedReply => "cached-reply",
            Opcode::CreateAccount => "create-account",
            Opcode::Deposit => "deposit",
            Opcode::Withdraw => "withdraw",
            Opcode::CloseAccount => "close-account",
            Opcode::Transfer => "transfer",
            Opcode::StartMonitoring => "start-monitoring",
            Opcode::BalanceQuery => "balance-query",
            Opcode::StopMonitoring => "stop-monitoring",
        }
    }
}

impl TryFrom<i32> for Opcode {
    type Error = CodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::CachedReply),
            1 => Ok(Opcode::CreateAccount),
            2 => Ok(Opcode::Deposit),
            3 => Ok(Opcode::Withdraw),
            4 => Ok(Opcode::CloseAccount),
            5 => Ok(Opcode::Transfer),
            6 => Ok(Opcode::StartMonitoring),
            7 => Ok(Opcode::BalanceQuery),
            8 => Ok(Opcode::StopMonitoring),
            _ => Err(CodeError::UnknownOpcode(value)),
        }
    }
}

impl From<Opcode> for i32 {
    fn from(opcode: Opcode) -> Self {
        opcode as i32
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

/// Status code, always the first field of every reply
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Ok = 200,
    Unauthorized = 401,
    Insufficient = 402,
    NotFound = 404,
}

impl StatusCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = CodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(StatusCode::Ok),
            401 => Ok(StatusCode::Unauthorized),
            402 => Ok(StatusCode::Insufficient),
            404 => Ok(StatusCode::NotFound),
            _ => Err(CodeError::UnknownStatus(value)),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusCode::Ok => "OK",
            StatusCode::Unauthorized => "UNAUTHORIZED",
            StatusCode::Insufficient => "INSUFFICIENT",
            StatusCode::NotFound => "NOT_FOUND",
        };
        write!(f, "{} {}", self.code(), label)
    }
}
