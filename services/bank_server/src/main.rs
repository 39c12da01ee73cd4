//! Bank server entry point

use anyhow::{Context, Result};
use bank_config::{InvocationSemantics, ServerConfig};
use bank_server::{Bank, BankServer};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    bind_address: Option<IpAddr>,

    /// Port
    #[arg(short, long)]
    port: Option<u16>,

    /// Invocation semantics: at-least-once or at-most-once
    #[arg(short, long)]
    semantics: Option<InvocationSemantics>,

    /// Reply cache capacity
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Probability of dropping each reply
    #[arg(long)]
    loss: Option<f64>,

    /// Seed for the loss injection RNG
    #[arg(long)]
    loss_seed: Option<u64>,

    /// Concurrent dispatch workers (1 = sequential)
    #[arg(short, long)]
    workers: Option<usize>,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(bind_address) = self.bind_address {
            config.bind_address = bind_address;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(semantics) = self.semantics {
            config.semantics = semantics;
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache_capacity = capacity;
        }
        if let Some(loss) = self.loss {
            config.loss_probability = loss;
        }
        if let Some(seed) = self.loss_seed {
            config.loss_seed = Some(seed);
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank_server=info,network=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting bank server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    let bank = Arc::new(Bank::new(config.exchange_rates.clone()));
    let server = BankServer::bind(config, bank)
        .await
        .context("Failed to start bank server")?;

    let dispatch = server.clone();
    tokio::select! {
        result = dispatch.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        }
    }

    let stats = server.stats();
    info!(
        "Bank server stopped: received={} executed={} cache_hits={} duplicates_dropped={} framing_errors={} replies_dropped={} pushes={}",
        stats.datagrams_received,
        stats.executions,
        stats.cache_hits,
        stats.duplicates_dropped,
        stats.framing_errors,
        stats.replies_dropped,
        stats.pushes_sent
    );
    Ok(())
}
