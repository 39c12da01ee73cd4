//! # Bank Server Dispatcher
//!
//! ## Purpose
//!
//! Owns every piece of server state (account service, reply cache,
//! observer registry, loss gate) and drives each inbound datagram through
//! identify, cache lookup, execute, cache store, reply and broadcast.
//!
//! ## Architecture Role
//!
//! ```text
//! UDP datagram ──► process() ──► Outcome ──► deliver() ──► sender
//!                     │                          │
//!                     ▼                          └──► every observer
//!              AccountService
//! ```
//!
//! [`BankServer::process`] is synchronous and does no I/O, so the decision
//! for a datagram (including cache and registry updates) is complete before
//! any byte leaves the socket. Under at-most-once the reply bytes are
//! cached before they are sent.
//!
//! ## Concurrency
//!
//! With `workers = 1` datagrams are processed strictly one at a time. With
//! more workers each datagram runs on its own task, bounded by a semaphore;
//! the account service, cache and registry carry their own locks, and the
//! cache's in-flight set keeps two copies of one call from both executing.

use crate::domain::AccountService;
use crate::error::{Result, ServerError};
use crate::observers::ObserverRegistry;
use crate::reply_cache::{CacheLookup, ReplyCache};
use crate::stats::{ServerStats, ServerStatsSnapshot};
use bank_config::ServerConfig;
use bytes::Bytes;
use codec::{Envelope, Reply, Request};
use network::{LossGate, UdpConfig, UdpTransport};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use types::{CorrelationId, Opcode};

/// Reply ready to leave the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub correlation_id: CorrelationId,
    /// [`Opcode::CachedReply`] when the bytes came from the reply cache
    pub opcode: Opcode,
    pub bytes: Bytes,
    /// Whether observers receive a copy
    pub broadcast: bool,
}

/// What the dispatcher decided for one datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(Dispatch),
    /// Malformed, or a duplicate of a call still executing
    Dropped,
}

pub struct BankServer {
    config: ServerConfig,
    transport: UdpTransport,
    service: Arc<dyn AccountService>,
    cache: ReplyCache,
    observers: ObserverRegistry,
    loss: LossGate,
    stats: ServerStats,
}

impl BankServer {
    /// Bind the server socket described by `config`
    pub async fn bind(config: ServerConfig, service: Arc<dyn AccountService>) -> Result<Arc<Self>> {
        config.validate().map_err(|e| ServerError::Configuration {
            message: e.to_string(),
        })?;

        let transport = UdpTransport::new(UdpConfig {
            bind_address: config.socket_addr(),
            buffer_size: config.buffer_size,
            ..UdpConfig::default()
        })
        .await?;

        info!(
            "Bank server bound to {} ({}, cache capacity {}, loss {})",
            transport.local_addr()?,
            config.semantics,
            config.cache_capacity,
            config.loss_probability
        );

        Ok(Arc::new(Self {
            cache: ReplyCache::new(config.cache_capacity),
            observers: ObserverRegistry::new(config.observer_ttl()),
            loss: LossGate::new(config.loss_probability, config.loss_seed),
            stats: ServerStats::default(),
            transport,
            service,
            config,
        }))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn stats(&self) -> ServerStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn cache(&self) -> &ReplyCache {
        &self.cache
    }

    /// Decide the reply for one datagram without sending anything
    pub fn process(&self, datagram: &[u8], sender: SocketAddr) -> Outcome {
        self.stats.record_received();

        let envelope = match Envelope::decode(datagram) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.stats.record_framing_error();
                warn!("Dropping malformed datagram from {}: {}", sender, e);
                return Outcome::Dropped;
            }
        };

        let correlation_id = envelope.correlation_id;
        let opcode = envelope.request.opcode();
        debug!("Request {} {} from {}", correlation_id, opcode, sender);

        let deduplicate = self.config.semantics.deduplicates() && !opcode.is_monitoring_control();
        if deduplicate {
            match self.cache.begin(correlation_id) {
                CacheLookup::Hit(bytes) => {
                    self.stats.record_cache_hit();
                    debug!("Replaying cached reply for {}", correlation_id);
                    return Outcome::Reply(Dispatch {
                        correlation_id,
                        opcode: Opcode::CachedReply,
                        bytes,
                        broadcast: false,
                    });
                }
                CacheLookup::InFlight => {
                    self.stats.record_duplicate_dropped();
                    debug!("Dropping duplicate of in-flight call {}", correlation_id);
                    return Outcome::Dropped;
                }
                CacheLookup::Miss => {}
            }
        }

        let reply = self.execute(envelope.request, sender);
        let bytes = reply.encode();
        if deduplicate {
            self.cache.put(correlation_id, bytes.clone());
        }

        Outcome::Reply(Dispatch {
            correlation_id,
            opcode,
            broadcast: !opcode.is_monitoring_control(),
            bytes,
        })
    }

    fn execute(&self, request: Request, sender: SocketAddr) -> Reply {
        self.stats.record_execution();
        let opcode = request.opcode();

        let result = match &request {
            Request::OpenAccount(r) => self.service.open_account(r),
            Request::Deposit(r) => self.service.deposit(r),
            Request::Withdraw(r) => self.service.withdraw(r),
            Request::CloseAccount(r) => self.service.close_account(r),
            Request::Transfer(r) => self.service.transfer(r),
            Request::BalanceQuery(r) => self.service.balance(r),
            Request::StartMonitoring => {
                self.observers.add(sender, sender);
                return Reply::Ack;
            }
            Request::StopMonitoring => {
                self.observers.remove(&sender);
                return Reply::Ack;
            }
        };

        match result {
            Ok(snapshot) => Reply::Account(snapshot),
            Err(failure) => {
                debug!("{} from {} rejected: {}", opcode, sender, failure);
                Reply::Failure(failure)
            }
        }
    }

    /// Send a dispatched reply, then copy it to observers
    ///
    /// One loss decision covers both: a dropped reply is never broadcast.
    pub async fn deliver(&self, sender: SocketAddr, dispatch: Dispatch) {
        if self.loss.should_drop() {
            self.stats.record_reply_dropped();
            debug!(
                "Loss injection dropped reply {} {} to {}",
                dispatch.correlation_id, dispatch.opcode, sender
            );
            return;
        }

        if let Err(e) = self.transport.send_to(&dispatch.bytes, sender).await {
            warn!("Failed to reply to {}: {}", sender, e);
        }

        if !dispatch.broadcast {
            return;
        }

        self.observers.prune_expired();
        for destination in self.observers.destinations() {
            match self.transport.send_to(&dispatch.bytes, destination).await {
                Ok(()) => self.stats.record_push(),
                Err(e) => warn!("Failed to push update to observer {}: {}", destination, e),
            }
        }
    }

    async fn handle(&self, datagram: Bytes, sender: SocketAddr) {
        if let Outcome::Reply(dispatch) = self.process(&datagram, sender) {
            self.deliver(sender, dispatch).await;
        }
    }

    /// Receive and fully handle one datagram
    pub async fn serve_one(&self) -> Result<()> {
        let (datagram, sender) = self.transport.receive_from().await?;
        self.handle(datagram, sender).await;
        Ok(())
    }

    /// Dispatch loop; returns only on an unrecoverable socket error
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let workers = self.config.workers.max(1);
        info!("Dispatch loop started with {} worker(s)", workers);

        if workers == 1 {
            loop {
                match self.serve_one().await {
                    Ok(()) => {}
                    Err(ServerError::Transport(e)) if e.is_retryable() => {
                        warn!("Receive failed, continuing: {}", e);
                    }
                    Err(e) => {
                        error!("Dispatch loop stopped: {}", e);
                        return Err(e);
                    }
                }
            }
        }

        let permits = Arc::new(Semaphore::new(workers));
        loop {
            let Ok(permit) = permits.clone().acquire_owned().await else {
                return Ok(());
            };

            let (datagram, sender) = match self.transport.receive_from().await {
                Ok(received) => received,
                Err(e) if e.is_retryable() => {
                    warn!("Receive failed, continuing: {}", e);
                    continue;
                }
                Err(e) => {
                    error!("Dispatch loop stopped: {}", e);
                    return Err(e.into());
                }
            };

            let server = self.clone();
            tokio::spawn(async move {
                server.handle(datagram, sender).await;
                drop(permit);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bank, DomainResult};
    use bank_config::{ExchangeRates, InvocationSemantics};
    use codec::{BalanceQuery, CloseAccount, FundsMovement, OpenAccount, Transfer};
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use types::{AccountSnapshot, Currency, DomainFailure, Money, StatusCode};

    /// Counts calls that reach the account service
    struct Counting {
        inner: Bank,
        calls: AtomicUsize,
    }

    impl Counting {
        fn tick(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl AccountService for Counting {
        fn open_account(&self, r: &OpenAccount) -> DomainResult<AccountSnapshot> {
            self.tick();
            self.inner.open_account(r)
        }
        fn deposit(&self, r: &FundsMovement) -> DomainResult<AccountSnapshot> {
            self.tick();
            self.inner.deposit(r)
        }
        fn withdraw(&self, r: &FundsMovement) -> DomainResult<AccountSnapshot> {
            self.tick();
            self.inner.withdraw(r)
        }
        fn transfer(&self, r: &Transfer) -> DomainResult<AccountSnapshot> {
            self.tick();
            self.inner.transfer(r)
        }
        fn close_account(&self, r: &CloseAccount) -> DomainResult<AccountSnapshot> {
            self.tick();
            self.inner.close_account(r)
        }
        fn balance(&self, r: &BalanceQuery) -> DomainResult<AccountSnapshot> {
            self.tick();
            self.inner.balance(r)
        }
    }

    async fn server(semantics: InvocationSemantics) -> (Arc<BankServer>, Arc<Counting>) {
        let config = ServerConfig {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            semantics,
            ..ServerConfig::default()
        };
        let service = Arc::new(Counting {
            inner: Bank::with_seed(ExchangeRates::default(), 3),
            calls: AtomicUsize::new(0),
        });
        let server = BankServer::bind(config, service.clone()).await.unwrap();
        (server, service)
    }

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    fn open_request() -> Request {
        Request::OpenAccount(OpenAccount {
            holder: "John Smith".to_string(),
            currency: Currency::Nzd,
            password: "P@ssword".to_string(),
            initial_balance: Money::parse("1000.00").unwrap(),
        })
    }

    fn expect_reply(outcome: Outcome) -> Dispatch {
        match outcome {
            Outcome::Reply(dispatch) => dispatch,
            Outcome::Dropped => panic!("expected a reply"),
        }
    }

    fn opened(server: &BankServer) -> AccountSnapshot {
        let bytes = Envelope::new(open_request()).encode().unwrap();
        let dispatch = expect_reply(server.process(&bytes, peer(4000)));
        match Reply::decode(&dispatch.bytes).unwrap() {
            Reply::Account(snapshot) => snapshot,
            other => panic!("unexpected reply {:?}", other),
        }
    }

    fn deposit(account: &AccountSnapshot, amount: &str) -> Request {
        Request::Deposit(FundsMovement {
            holder: account.holder.clone(),
            account: account.number,
            password: "P@ssword".to_string(),
            currency: account.currency,
            amount: Money::parse(amount).unwrap(),
        })
    }

    #[tokio::test]
    async fn test_at_most_once_replays_cached_bytes() {
        let (server, service) = server(InvocationSemantics::AtMostOnce).await;
        let bytes = Envelope::new(open_request()).encode().unwrap();

        let first = expect_reply(server.process(&bytes, peer(4000)));
        assert_eq!(first.opcode, Opcode::CreateAccount);
        assert!(first.broadcast);

        for _ in 0..4 {
            let again = expect_reply(server.process(&bytes, peer(4000)));
            assert_eq!(again.opcode, Opcode::CachedReply);
            assert_eq!(again.bytes, first.bytes);
            assert!(!again.broadcast);
        }

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        let stats = server.stats();
        assert_eq!(stats.executions, 1);
        assert_eq!(stats.cache_hits, 4);
    }

    #[tokio::test]
    async fn test_at_least_once_reexecutes() {
        let (server, service) = server(InvocationSemantics::AtLeastOnce).await;
        let account = opened(&server);
        let bytes = Envelope::new(deposit(&account, "10")).encode().unwrap();

        let mut last = None;
        for _ in 0..3 {
            last = Some(expect_reply(server.process(&bytes, peer(4000))));
        }
        let reply = Reply::decode(&last.unwrap().bytes).unwrap();
        match reply {
            Reply::Account(snapshot) => assert_eq!(snapshot.balance, Money::parse("1030.00").unwrap()),
            other => panic!("unexpected reply {:?}", other),
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 4);
        assert!(server.cache().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_cached_and_broadcast() {
        let (server, service) = server(InvocationSemantics::AtMostOnce).await;
        let account = opened(&server);
        let mut request = deposit(&account, "5");
        if let Request::Deposit(movement) = &mut request {
            movement.password = "wrong".to_string();
        }
        let bytes = Envelope::new(request).encode().unwrap();

        let first = expect_reply(server.process(&bytes, peer(4000)));
        assert!(first.broadcast);
        assert_eq!(
            Reply::decode(&first.bytes).unwrap(),
            Reply::Failure(DomainFailure::Unauthorized)
        );

        let again = expect_reply(server.process(&bytes, peer(4000)));
        assert_eq!(again.bytes, first.bytes);
        assert!(!again.broadcast);
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_monitoring_control_manages_observers() {
        let (server, _) = server(InvocationSemantics::AtMostOnce).await;
        let start = Envelope::new(Request::StartMonitoring).encode().unwrap();
        let stop = Envelope::new(Request::StopMonitoring).encode().unwrap();

        let ack = expect_reply(server.process(&start, peer(5000)));
        assert_eq!(Reply::decode(&ack.bytes).unwrap().status(), StatusCode::Ok);
        assert!(!ack.broadcast);
        assert!(server.observers().contains(&peer(5000)));
        assert!(server.cache().is_empty());

        // Start is idempotent; stop of an unknown peer is a no-op
        server.process(&start, peer(5000));
        server.process(&stop, peer(5001));
        assert_eq!(server.observers().len(), 1);

        server.process(&stop, peer(5000));
        assert!(server.observers().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_datagram_is_dropped() {
        let (server, service) = server(InvocationSemantics::AtMostOnce).await;

        assert_eq!(server.process(&[0u8; 7], peer(4000)), Outcome::Dropped);

        let mut unknown = vec![1u8; 16];
        unknown.extend_from_slice(&42i32.to_be_bytes());
        assert_eq!(server.process(&unknown, peer(4000)), Outcome::Dropped);

        let mut truncated = Envelope::new(open_request()).encode().unwrap().to_vec();
        truncated.truncate(truncated.len() - 6);
        assert_eq!(server.process(&truncated, peer(4000)), Outcome::Dropped);

        assert_eq!(server.stats().framing_errors, 3);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_in_flight_duplicate_is_dropped() {
        let (server, service) = server(InvocationSemantics::AtMostOnce).await;
        let envelope = Envelope::new(open_request());

        assert_eq!(server.cache().begin(envelope.correlation_id), CacheLookup::Miss);
        let bytes = envelope.encode().unwrap();
        assert_eq!(server.process(&bytes, peer(4000)), Outcome::Dropped);
        assert_eq!(server.stats().duplicates_dropped, 1);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config() {
        let config = ServerConfig {
            loss_probability: 2.0,
            ..ServerConfig::default()
        };
        let service = Arc::new(Bank::new(ExchangeRates::default()));
        let result = BankServer::bind(config, service).await;
        assert!(matches!(result, Err(ServerError::Configuration { .. })));
    }
}
