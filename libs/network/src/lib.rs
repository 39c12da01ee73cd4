//! # Bank RPC Network Layer
//!
//! ## Purpose
//!
//! Moves envelopes and replies over UDP and turns an unreliable transport
//! into request/reply calls:
//! - [`UdpTransport`]: bind, send, receive with optional timeout
//! - [`LossGate`]: seeded loss injection shared by client and server
//! - [`RpcClient`]: the send/await/retry loop and the monitoring session
//!
//! ## Architecture Role
//!
//! ```text
//! libs/codec → [network] → services/bank_client
//!                  ↓
//!          services/bank_server
//! ```
//!
//! ## Error Taxonomy
//!
//! - Transport (timeout, simulated loss): retried inside [`RpcClient`], never surfaced
//! - Domain (`NOT_FOUND`, `UNAUTHORIZED`, `INSUFFICIENT`): [`RpcError::Domain`]
//! - Protocol (malformed reply, unknown status): [`RpcError::Protocol`]
//! - Hard socket failures (bind, non-retryable IO): [`RpcError::Transport`]

pub mod client;
pub mod error;
pub mod loss;
pub mod transports;

pub use client::{ClientStats, MonitorUpdate, RpcClient, RpcClientConfig};
pub use error::{Result, RpcError, RpcResult, TransportError};
pub use loss::LossGate;
pub use transports::{UdpConfig, UdpStats, UdpTransport};
