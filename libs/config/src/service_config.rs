//! Service Configuration Module
//!
//! Provides configuration loading for the bank server and client.
//! Each loads built-in defaults, then an optional TOML file, then
//! environment variables (`BANK_SERVER_*` / `BANK_CLIENT_*`, nested keys
//! joined with `__`, e.g. `BANK_SERVER_EXCHANGE_RATES__NZD=1.08`).

use crate::semantics::InvocationSemantics;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use types::{Currency, DEFAULT_BUFFER_SIZE, DEFAULT_SERVER_PORT, MAX_DATAGRAM_SIZE};

pub const SERVER_ENV_PREFIX: &str = "BANK_SERVER";
pub const CLIENT_ENV_PREFIX: &str = "BANK_CLIENT";

/// Exchange rates against a common base, one per supported currency
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExchangeRates {
    pub sgd: Decimal,
    pub nzd: Decimal,
    pub usd: Decimal,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self {
            sgd: Decimal::new(100, 2),
            nzd: Decimal::new(107, 2),
            usd: Decimal::new(74, 2),
        }
    }
}

impl ExchangeRates {
    pub fn rate(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Sgd => self.sgd,
            Currency::Nzd => self.nzd,
            Currency::Usd => self.usd,
        }
    }
}

/// Bank server settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Receive buffer size in bytes
    pub buffer_size: usize,
    pub semantics: InvocationSemantics,
    /// Reply cache capacity (entries)
    pub cache_capacity: usize,
    /// Probability of dropping each outbound reply
    pub loss_probability: f64,
    pub loss_seed: Option<u64>,
    /// 1 processes datagrams strictly one at a time
    pub workers: usize,
    /// Observer registrations older than this are pruned; unset never expires
    pub observer_ttl_secs: Option<u64>,
    pub exchange_rates: ExchangeRates,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_SERVER_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            semantics: InvocationSemantics::default(),
            cache_capacity: 100,
            loss_probability: 0.0,
            loss_seed: None,
            workers: 1,
            observer_ttl_secs: None,
            exchange_rates: ExchangeRates::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = load_layered(path, SERVER_ENV_PREFIX)?;
        config.validate()?;
        info!(
            "Server configuration: {}:{} semantics={} workers={}",
            config.bind_address, config.port, config.semantics, config.workers
        );
        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn observer_ttl(&self) -> Option<Duration> {
        self.observer_ttl_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        validate_buffer_size(self.buffer_size)?;
        validate_probability(self.loss_probability)?;
        if self.cache_capacity == 0 {
            bail!("cache_capacity must be greater than 0");
        }
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.observer_ttl_secs == Some(0) {
            bail!("observer_ttl_secs must be greater than 0 when set");
        }
        for currency in Currency::ALL {
            let rate = self.exchange_rates.rate(currency);
            if rate <= Decimal::ZERO {
                bail!("exchange rate for {} must be positive, got {}", currency, rate);
            }
        }
        Ok(())
    }
}

/// Bank client settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the server
    pub server_address: String,
    pub buffer_size: usize,
    /// Wait before resending an unanswered request
    pub retry_timeout_ms: u64,
    /// Probability of discarding each received reply
    pub loss_probability: f64,
    pub loss_seed: Option<u64>,
    /// Receive timeout of each poll while monitoring
    pub monitor_poll_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: format!("127.0.0.1:{}", DEFAULT_SERVER_PORT),
            buffer_size: DEFAULT_BUFFER_SIZE,
            retry_timeout_ms: 2000,
            loss_probability: 0.0,
            loss_seed: None,
            monitor_poll_ms: 10,
        }
    }
}

impl ClientConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = load_layered(path, CLIENT_ENV_PREFIX)?;
        config.validate()?;
        debug!("Client configuration: {:?}", config);
        Ok(config)
    }

    /// Resolve `server_address`, accepting host names
    pub fn server_socket_addr(&self) -> Result<SocketAddr> {
        self.server_address
            .to_socket_addrs()
            .with_context(|| format!("Failed to resolve server address '{}'", self.server_address))?
            .next()
            .with_context(|| format!("No address found for '{}'", self.server_address))
    }

    pub fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }

    pub fn monitor_poll(&self) -> Duration {
        Duration::from_millis(self.monitor_poll_ms)
    }

    pub fn validate(&self) -> Result<()> {
        validate_buffer_size(self.buffer_size)?;
        validate_probability(self.loss_probability)?;
        if self.retry_timeout_ms == 0 {
            bail!("retry_timeout_ms must be greater than 0");
        }
        if self.monitor_poll_ms == 0 {
            bail!("monitor_poll_ms must be greater than 0");
        }
        Ok(())
    }
}

/// Defaults, then the optional file, then prefixed environment variables
fn load_layered<T: DeserializeOwned>(path: Option<&Path>, env_prefix: &str) -> Result<T> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        debug!("Loading configuration file: {:?}", path);
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build().context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

fn validate_buffer_size(buffer_size: usize) -> Result<()> {
    if buffer_size == 0 || buffer_size > MAX_DATAGRAM_SIZE {
        bail!(
            "buffer_size must be within 1..={}, got {}",
            MAX_DATAGRAM_SIZE,
            buffer_size
        );
    }
    Ok(())
}

fn validate_probability(probability: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&probability) {
        bail!("loss_probability must be within [0, 1], got {}", probability);
    }
    Ok(())
}
