//! Transport and RPC Error Types
//!
//! `TransportError` covers sockets and timeouts. `RpcError` is what a caller
//! of [`crate::RpcClient`] sees: timeouts and simulated loss are retried
//! internally and never surface, so only domain failures, malformed replies
//! and hard socket failures reach it.

use codec::ProtocolError;
use thiserror::Error;
use types::DomainFailure;

/// Main transport error type
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network connectivity errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Oversized or otherwise unsendable datagrams
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Transport timeout errors
    #[error("Timeout error: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source
    pub fn network_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: field.map(|s| s.to_string()),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    /// Check if this is a retryable error
    ///
    /// A refused port (ICMP unreachable surfacing on a connected socket) is
    /// treated like loss: the server may simply not be up yet.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network { .. } => true,
            TransportError::Timeout { .. } => true,
            TransportError::Protocol { .. } => false,
            TransportError::Configuration { .. } => false,
        }
    }

    /// Get error category for logs
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Network { .. } => "network",
            TransportError::Protocol { .. } => "protocol",
            TransportError::Configuration { .. } => "configuration",
            TransportError::Timeout { .. } => "timeout",
        }
    }
}

/// Terminal outcome of one remote invocation
#[derive(Error, Debug)]
pub enum RpcError {
    /// The server answered with a non-`OK` status
    #[error("Request rejected: {0}")]
    Domain(DomainFailure),

    /// The reply could not be decoded
    #[error("Malformed reply: {0}")]
    Protocol(#[from] ProtocolError),

    /// The endpoint could not be opened or used
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<DomainFailure> for RpcError {
    fn from(failure: DomainFailure) -> Self {
        RpcError::Domain(failure)
    }
}

impl RpcError {
    /// The domain failure, if the server rejected the request
    pub fn domain_failure(&self) -> Option<DomainFailure> {
        match self {
            RpcError::Domain(failure) => Some(*failure),
            _ => None,
        }
    }
}

pub type RpcResult<T> = std::result::Result<T, RpcError>;
