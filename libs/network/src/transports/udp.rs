//! UDP Network Transport Implementation
//!
//! Raw datagram transport: one payload per packet, no extra framing. The
//! bank protocol's own envelope carries everything a peer needs, so the
//! bytes handed to [`UdpTransport::send_to`] are exactly the bytes the
//! peer's [`UdpTransport::receive_from`] returns.

use super::metrics::{MetricsTracker, UdpStats};
use crate::{Result, TransportError};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info};
use types::{DEFAULT_BUFFER_SIZE, MAX_DATAGRAM_SIZE};

/// UDP transport configuration
#[derive(Debug, Clone)]
pub struct UdpConfig {
    /// Local address to bind to
    pub bind_address: SocketAddr,
    /// Remote address for connected mode (optional)
    pub remote_address: Option<SocketAddr>,
    /// Receive buffer size; longer datagrams are truncated by the kernel
    pub buffer_size: usize,
    /// Maximum outbound datagram size
    pub max_message_size: usize,
    /// Receive timeout, `None` blocks until a datagram arrives
    pub timeout: Option<Duration>,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 0)),
            remote_address: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: MAX_DATAGRAM_SIZE,
            timeout: None,
        }
    }
}

impl UdpConfig {
    /// Ephemeral local endpoint connected to `remote`
    ///
    /// Binds the unspecified address of the same family as `remote`.
    pub fn connected(remote: SocketAddr, buffer_size: usize, timeout: Duration) -> Self {
        let bind_address = match remote {
            SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
            SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
        };
        Self {
            bind_address,
            remote_address: Some(remote),
            buffer_size,
            max_message_size: MAX_DATAGRAM_SIZE,
            timeout: Some(timeout),
        }
    }
}

/// UDP transport for datagram communication
pub struct UdpTransport {
    config: UdpConfig,
    socket: Arc<UdpSocket>,
    recv_buffer: Mutex<BytesMut>,
    metrics: MetricsTracker,
}

impl UdpTransport {
    /// Bind (and optionally connect) a new endpoint
    pub async fn new(config: UdpConfig) -> Result<Self> {
        if config.max_message_size > MAX_DATAGRAM_SIZE {
            return Err(TransportError::configuration(
                format!("UDP max message size cannot exceed {} bytes", MAX_DATAGRAM_SIZE),
                Some("max_message_size"),
            ));
        }
        if config.buffer_size == 0 || config.buffer_size > MAX_DATAGRAM_SIZE {
            return Err(TransportError::configuration(
                format!("UDP buffer size must be within 1..={}", MAX_DATAGRAM_SIZE),
                Some("buffer_size"),
            ));
        }

        let socket = UdpSocket::bind(config.bind_address).await.map_err(|e| {
            TransportError::network_with_source(
                format!("Failed to bind UDP socket on {}", config.bind_address),
                e,
            )
        })?;

        if let Some(remote) = config.remote_address {
            socket.connect(remote).await.map_err(|e| {
                TransportError::network_with_source(
                    format!("Failed to connect UDP socket to {}", remote),
                    e,
                )
            })?;
            debug!("UDP socket connected to: {}", remote);
        } else {
            info!("UDP transport listening on: {}", config.bind_address);
        }

        Ok(Self {
            recv_buffer: Mutex::new(BytesMut::with_capacity(config.buffer_size)),
            config,
            socket: Arc::new(socket),
            metrics: MetricsTracker::new(),
        })
    }

    fn check_size(&self, data: &[u8]) -> Result<()> {
        if data.len() > self.config.max_message_size {
            return Err(TransportError::protocol(format!(
                "Message size {} exceeds maximum {}",
                data.len(),
                self.config.max_message_size
            )));
        }
        Ok(())
    }

    /// Send to the connected remote
    pub async fn send(&self, data: &[u8]) -> Result<()> {
        self.check_size(data)?;
        let bytes_sent = self.socket.send(data).await.map_err(|e| {
            self.metrics.record_error();
            TransportError::network_with_source("Failed to send UDP packet", e)
        })?;
        self.metrics.record_send(bytes_sent);
        debug!("Sent UDP packet: {} bytes", bytes_sent);
        Ok(())
    }

    /// Send to specific address (for unconnected mode)
    pub async fn send_to(&self, data: &[u8], addr: SocketAddr) -> Result<()> {
        self.check_size(data)?;
        let bytes_sent = self.socket.send_to(data, addr).await.map_err(|e| {
            self.metrics.record_error();
            TransportError::network_with_source(format!("Failed to send UDP packet to {}", addr), e)
        })?;
        self.metrics.record_send(bytes_sent);
        debug!("Sent UDP packet to {}: {} bytes", addr, bytes_sent);
        Ok(())
    }

    /// Receive one datagram from the connected remote, bounded by the configured timeout
    pub async fn receive(&self) -> Result<Bytes> {
        let wait = self.config.timeout;
        self.receive_from_inner(wait).await.map(|(payload, _)| payload)
    }

    /// Receive one datagram from the connected remote, bounded by `wait`
    pub async fn receive_within(&self, wait: Duration) -> Result<Bytes> {
        self.receive_from_inner(Some(wait))
            .await
            .map(|(payload, _)| payload)
    }

    /// Receive from any address (returns data and sender address)
    pub async fn receive_from(&self) -> Result<(Bytes, SocketAddr)> {
        let wait = self.config.timeout;
        self.receive_from_inner(wait).await
    }

    async fn receive_from_inner(&self, wait: Option<Duration>) -> Result<(Bytes, SocketAddr)> {
        let mut buffer = self.recv_buffer.lock().await;
        buffer.resize(self.config.buffer_size, 0);

        let received = match wait {
            Some(wait) => timeout(wait, self.socket.recv_from(&mut buffer))
                .await
                .map_err(|_| TransportError::timeout("UDP receive", wait.as_millis() as u64))?,
            None => self.socket.recv_from(&mut buffer).await,
        };
        let (bytes_received, sender) = received.map_err(|e| {
            self.metrics.record_error();
            TransportError::network_with_source("Failed to receive UDP packet", e)
        })?;

        let payload = Bytes::copy_from_slice(&buffer[..bytes_received]);
        self.metrics.record_receive(bytes_received);
        debug!("Received UDP packet from {}: {} bytes", sender, bytes_received);

        Ok((payload, sender))
    }

    /// Get transport statistics
    pub fn stats(&self) -> UdpStats {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &UdpConfig {
        &self.config
    }

    /// Get local address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| TransportError::network_with_source("Failed to get local address", e))
    }
}
