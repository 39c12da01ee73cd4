//! Core E2E testing framework

use anyhow::{Context, Result};
use bank_client::BankClient;
use bank_config::{ExchangeRates, InvocationSemantics, ServerConfig};
use bank_server::{Bank, BankServer};
use codec::Envelope;
use network::{RpcClientConfig, UdpConfig, UdpTransport};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per process
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone)]
pub struct TestConfig {
    pub semantics: InvocationSemantics,
    pub workers: usize,
    pub server_loss: f64,
    pub server_loss_seed: Option<u64>,
    pub client_loss: f64,
    pub client_loss_seed: Option<u64>,
    /// Client resend interval; short so lossy scenarios finish quickly
    pub retry_timeout: Duration,
    /// Seed for account-number allocation
    pub bank_seed: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            semantics: InvocationSemantics::AtMostOnce,
            workers: 1,
            server_loss: 0.0,
            server_loss_seed: None,
            client_loss: 0.0,
            client_loss_seed: None,
            retry_timeout: Duration::from_millis(100),
            bank_seed: 42,
        }
    }
}

impl TestConfig {
    pub fn with_semantics(mut self, semantics: InvocationSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn with_server_loss(mut self, probability: f64, seed: u64) -> Self {
        self.server_loss = probability;
        self.server_loss_seed = Some(seed);
        self
    }

    pub fn with_client_loss(mut self, probability: f64, seed: u64) -> Self {
        self.client_loss = probability;
        self.client_loss_seed = Some(seed);
        self
    }
}

/// A running server plus factories for clients talking to it
pub struct TestFramework {
    config: TestConfig,
    server: Arc<BankServer>,
    address: SocketAddr,
    handle: JoinHandle<bank_server::Result<()>>,
}

impl TestFramework {
    pub async fn start(config: TestConfig) -> Result<Self> {
        init_tracing();

        let server_config = ServerConfig {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            semantics: config.semantics,
            workers: config.workers,
            loss_probability: config.server_loss,
            loss_seed: config.server_loss_seed,
            ..ServerConfig::default()
        };
        let bank = Arc::new(Bank::with_seed(ExchangeRates::default(), config.bank_seed));
        let server = BankServer::bind(server_config, bank)
            .await
            .context("Failed to bind test server")?;
        let address = server.local_addr()?;
        let handle = tokio::spawn(server.clone().run());

        info!("Test server running on {} ({})", address, config.semantics);
        Ok(Self {
            config,
            server,
            address,
            handle,
        })
    }

    pub fn server(&self) -> &Arc<BankServer> {
        &self.server
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Client using the configured client-side loss
    pub fn client(&self) -> BankClient {
        self.client_with_loss(self.config.client_loss, self.config.client_loss_seed)
    }

    /// Client that never drops replies
    pub fn reliable_client(&self) -> BankClient {
        self.client_with_loss(0.0, None)
    }

    pub fn client_with_loss(&self, probability: f64, seed: Option<u64>) -> BankClient {
        BankClient::new(RpcClientConfig {
            server_address: self.address,
            retry_timeout: self.config.retry_timeout,
            loss_probability: probability,
            loss_seed: seed,
            ..RpcClientConfig::default()
        })
    }

    /// Send the same envelope bytes `times` times from one endpoint and
    /// collect every reply that arrives
    pub async fn replay(&self, envelope: &Envelope, times: usize) -> Result<Vec<Vec<u8>>> {
        let endpoint = UdpTransport::new(UdpConfig::connected(
            self.address,
            types::DEFAULT_BUFFER_SIZE,
            Duration::from_millis(300),
        ))
        .await?;
        let bytes = envelope.encode()?;

        let mut replies = Vec::with_capacity(times);
        for attempt in 0..times {
            endpoint.send(&bytes).await?;
            // Wait for each answer so sequential semantics are observable
            match endpoint.receive().await {
                Ok(reply) => replies.push(reply.to_vec()),
                Err(e) if e.is_timeout() => debug!("Replay {} unanswered", attempt),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(replies)
    }

    /// Wait until the server has `count` observers registered
    pub async fn wait_for_observers(&self, count: usize) -> Result<()> {
        let wait = async {
            while self.server.observers().len() != count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .with_context(|| format!("Timed out waiting for {} observers", count))
    }
}

impl Drop for TestFramework {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
