//! # RPC Client - Send, Await, Retry
//!
//! ## Purpose
//!
//! Manufactures invocation semantics on top of lossy datagrams. Each call
//! gets one envelope under a fresh correlation id; the exact same bytes are
//! resent until a reply is observed. A receive timeout and a fired loss
//! gate both count as "no reply". The loop has no attempt limit: progress
//! depends on the network eventually delivering one round trip.
//!
//! Whether the overall call executes at-least-once or at-most-once is up
//! to the server. Without a reply cache every retransmission may execute
//! again; with one, retries are answered from the cache.
//!
//! ## Monitoring
//!
//! [`RpcClient::monitor`] keeps one endpoint open for the whole session:
//! start (acknowledged with retries), poll with a short timeout until a
//! client-side deadline, then stop (again with retries). Any reply arriving
//! on that endpoint other than an ack is a push (an account projection or
//! the failure status of someone else's call) and is handed to the caller,
//! including while a start or stop ack is still outstanding.

use crate::error::{RpcError, RpcResult, TransportError};
use crate::loss::LossGate;
use crate::transports::{UdpConfig, UdpTransport};
use codec::{Envelope, ProtocolError, Reply, Request};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use types::{
    AccountSnapshot, CorrelationId, DomainFailure, DEFAULT_BUFFER_SIZE, DEFAULT_SERVER_PORT,
};

/// Client endpoint settings
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    pub server_address: SocketAddr,
    /// Largest datagram either end reads; longer requests are refused
    pub buffer_size: usize,
    /// How long to wait for a reply before resending
    pub retry_timeout: Duration,
    /// Probability of discarding a received reply as if it were lost
    pub loss_probability: f64,
    pub loss_seed: Option<u64>,
    /// Receive timeout of each poll while monitoring
    pub monitor_poll: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            server_address: SocketAddr::from(([127, 0, 0, 1], DEFAULT_SERVER_PORT)),
            buffer_size: DEFAULT_BUFFER_SIZE,
            retry_timeout: Duration::from_millis(2000),
            loss_probability: 0.0,
            loss_seed: None,
            monitor_poll: Duration::from_millis(10),
        }
    }
}

/// One broadcast observed during a monitoring session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorUpdate {
    Account(AccountSnapshot),
    Failure(DomainFailure),
}

/// Counters across every call made through one client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Datagrams sent, first attempts and retries alike
    pub attempts: u64,
    pub retries: u64,
    /// Replies discarded by the loss gate
    pub dropped_replies: u64,
    pub pushes: u64,
}

#[derive(Debug, Default)]
struct ClientCounters {
    attempts: AtomicU64,
    retries: AtomicU64,
    dropped_replies: AtomicU64,
    pushes: AtomicU64,
}

/// Blocking-style RPC client: one call runs to completion, retries included
#[derive(Debug)]
pub struct RpcClient {
    config: RpcClientConfig,
    loss: LossGate,
    counters: ClientCounters,
}

impl RpcClient {
    pub fn new(config: RpcClientConfig) -> Self {
        let loss = LossGate::new(config.loss_probability, config.loss_seed);
        Self {
            config,
            loss,
            counters: ClientCounters::default(),
        }
    }

    pub fn config(&self) -> &RpcClientConfig {
        &self.config
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            attempts: self.counters.attempts.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            dropped_replies: self.counters.dropped_replies.load(Ordering::Relaxed),
            pushes: self.counters.pushes.load(Ordering::Relaxed),
        }
    }

    async fn open_endpoint(&self) -> RpcResult<UdpTransport> {
        let config = UdpConfig::connected(
            self.config.server_address,
            self.config.buffer_size,
            self.config.retry_timeout,
        );
        Ok(UdpTransport::new(config).await?)
    }

    /// Invoke one operation and wait for its reply
    ///
    /// `OK` replies come back as `Reply::Account` or `Reply::Ack`; any
    /// other status becomes [`RpcError::Domain`].
    pub async fn invoke(&self, request: Request) -> RpcResult<Reply> {
        let envelope = Envelope::new(request);
        let endpoint = self.open_endpoint().await?;
        let mut ignore_pushes = |_: MonitorUpdate| {};
        self.exchange(&endpoint, &envelope, &mut ignore_pushes).await
    }

    /// Run a monitoring session until `duration` has elapsed
    ///
    /// Returns the number of pushes delivered to `on_update`.
    pub async fn monitor<F>(&self, duration: Duration, mut on_update: F) -> RpcResult<u64>
    where
        F: FnMut(MonitorUpdate) + Send,
    {
        let endpoint = self.open_endpoint().await?;
        let deadline = Instant::now() + duration;
        let mut delivered = 0u64;
        let mut surface = |update: MonitorUpdate| {
            delivered += 1;
            on_update(update);
        };

        self.exchange(&endpoint, &Envelope::new(Request::StartMonitoring), &mut surface)
            .await?;
        info!("Monitoring {} for {:?}", self.config.server_address, duration);

        while Instant::now() < deadline {
            let wait = self
                .config
                .monitor_poll
                .min(deadline.saturating_duration_since(Instant::now()));
            match endpoint.receive_within(wait).await {
                Ok(datagram) => match Reply::decode(&datagram) {
                    Ok(Reply::Account(account)) => {
                        self.counters.pushes.fetch_add(1, Ordering::Relaxed);
                        surface(MonitorUpdate::Account(account));
                    }
                    Ok(Reply::Failure(failure)) => {
                        self.counters.pushes.fetch_add(1, Ordering::Relaxed);
                        surface(MonitorUpdate::Failure(failure));
                    }
                    // Late ack from a retransmitted start
                    Ok(Reply::Ack) => debug!("Ignoring duplicate monitor ack"),
                    Err(e) => warn!("Discarding malformed push: {}", e),
                },
                Err(e) if e.is_timeout() => {}
                Err(e) if e.is_retryable() => {
                    warn!("Monitor poll failed ({}), continuing", e);
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.exchange(&endpoint, &Envelope::new(Request::StopMonitoring), &mut surface)
            .await?;
        info!("Monitoring stopped after {} updates", delivered);
        Ok(delivered)
    }

    /// Send `envelope` until a reply is observed on `endpoint`
    ///
    /// While waiting for a monitor control ack, every other reply is a
    /// push: it goes to `on_push` and the wait continues. Requests larger
    /// than `buffer_size` are refused before the first send, since the
    /// server would only ever read them truncated.
    async fn exchange(
        &self,
        endpoint: &UdpTransport,
        envelope: &Envelope,
        on_push: &mut (dyn FnMut(MonitorUpdate) + Send),
    ) -> RpcResult<Reply> {
        let bytes = envelope.encode()?;
        let opcode = envelope.request.opcode();
        if bytes.len() > self.config.buffer_size {
            return Err(ProtocolError::MessageTooLarge {
                size: bytes.len(),
                max: self.config.buffer_size,
            }
            .into());
        }
        let expects_ack = opcode.is_monitoring_control();
        let id = envelope.correlation_id;

        let mut attempt = 0u64;
        loop {
            attempt += 1;
            self.counters.attempts.fetch_add(1, Ordering::Relaxed);
            if attempt > 1 {
                self.counters.retries.fetch_add(1, Ordering::Relaxed);
            }
            debug!("Sending {} id={} attempt={}", opcode, id, attempt);

            if let Err(e) = endpoint.send(&bytes).await {
                if !e.is_retryable() {
                    return Err(e.into());
                }
                self.back_off(id, attempt, &e).await;
                continue;
            }

            match self.await_reply(endpoint, expects_ack, on_push).await {
                Ok(Some(reply)) => return settle(reply),
                Ok(None) => warn!(
                    "No reply for {} id={} attempt={}, resending",
                    opcode, id, attempt
                ),
                Err(RpcError::Transport(e)) if e.is_retryable() => {
                    self.back_off(id, attempt, &e).await
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Wait for the reply to the envelope just sent
    ///
    /// `Ok(None)` means "no reply observed": the timeout elapsed or the
    /// loss gate discarded what arrived.
    async fn await_reply(
        &self,
        endpoint: &UdpTransport,
        expects_ack: bool,
        on_push: &mut (dyn FnMut(MonitorUpdate) + Send),
    ) -> RpcResult<Option<Reply>> {
        let deadline = Instant::now() + self.config.retry_timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let datagram = match endpoint.receive_within(deadline - now).await {
                Ok(datagram) => datagram,
                Err(e) if e.is_timeout() => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            if self.loss.should_drop() {
                self.counters.dropped_replies.fetch_add(1, Ordering::Relaxed);
                debug!("Loss gate discarded a {} byte reply", datagram.len());
                return Ok(None);
            }

            // Monitor control is always acknowledged, so anything else
            // arriving before the ack is a broadcast
            let update = match Reply::decode(&datagram)? {
                Reply::Account(account) if expects_ack => MonitorUpdate::Account(account),
                Reply::Failure(failure) if expects_ack => MonitorUpdate::Failure(failure),
                reply => return Ok(Some(reply)),
            };
            self.counters.pushes.fetch_add(1, Ordering::Relaxed);
            on_push(update);
        }
    }

    async fn back_off(&self, id: CorrelationId, attempt: u64, error: &TransportError) {
        warn!(
            "Transport {} error for id={} attempt={}: {}",
            error.category(),
            id,
            attempt,
            error
        );
        tokio::time::sleep(self.config.retry_timeout).await;
    }
}

fn settle(reply: Reply) -> RpcResult<Reply> {
    match reply {
        Reply::Failure(failure) => Err(RpcError::Domain(failure)),
        ok => Ok(ok),
    }
}
