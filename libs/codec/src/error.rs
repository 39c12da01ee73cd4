//! Framing errors for datagram decoding
//!
//! Every variant describes a malformed buffer, never an application-level
//! failure. The server treats any of these as fatal for the one datagram it
//! was decoding; the client surfaces them as a generic protocol failure.
//! Each variant carries enough context (offsets, sizes, field names) to
//! debug a capture without re-running the exchange.

use thiserror::Error;
use types::CodeError;

/// Wire decoding errors with diagnostic context
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// Buffer is too small to contain the expected fixed-width data
    #[error("Message too small: need {need} bytes, got {got} (context: {context})")]
    MessageTooSmall {
        need: usize,
        got: usize,
        context: String,
    },

    /// A length-prefixed field runs past the end of the buffer
    #[error("Truncated field at offset {offset}: declared {declared} content bytes, buffer has {available} remaining (action: {suggested_action})")]
    TruncatedField {
        offset: usize,
        declared: usize,
        available: usize,
        suggested_action: String,
    },

    /// Length prefix is negative or larger than any datagram could carry
    #[error("Invalid field length {length} at offset {offset} (buffer: {buffer_size} bytes)")]
    InvalidLength {
        length: i64,
        offset: usize,
        buffer_size: usize,
    },

    /// Field content is not UTF-8
    #[error("Field at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    /// Field decoded as a string but does not parse as its schema type
    #[error("Invalid {field} field '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Unknown opcode or status code
    #[error(transparent)]
    Code(#[from] CodeError),

    /// Server-internal opcode received from the wire
    #[error("Opcode {opcode} is reserved for server-internal use")]
    ReservedOpcode { opcode: i32 },

    /// A reply had a shape its status code does not allow
    #[error("Unexpected reply shape: {description}")]
    UnexpectedReply { description: String },

    /// Encoded message exceeds the datagram limit
    #[error("Message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },
}

/// Result type for codec operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

impl ProtocolError {
    pub fn message_too_small(need: usize, got: usize, context: impl Into<String>) -> Self {
        Self::MessageTooSmall {
            need,
            got,
            context: context.into(),
        }
    }

    /// Create TruncatedField error with a hint about the likely cause
    pub fn truncated_field(offset: usize, declared: usize, available: usize) -> Self {
        let suggested_action = if available == 0 {
            "field list ended early - check the per-opcode schema on both ends"
        } else if declared > available * 2 {
            "likely corrupted length prefix"
        } else {
            "datagram truncated - increase the receive buffer size"
        };

        Self::TruncatedField {
            offset,
            declared,
            available,
            suggested_action: suggested_action.to_string(),
        }
    }

    pub fn invalid_length(length: i64, offset: usize, buffer_size: usize) -> Self {
        Self::InvalidLength {
            length,
            offset,
            buffer_size,
        }
    }

    pub fn invalid_field(
        field: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unexpected_reply(description: impl Into<String>) -> Self {
        Self::UnexpectedReply {
            description: description.into(),
        }
    }
}
