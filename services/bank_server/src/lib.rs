//! # Bank Server
//!
//! UDP request/reply server for the bank protocol: decodes envelopes,
//! deduplicates retransmissions under at-most-once semantics, executes
//! account operations and copies state changes to monitoring clients.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bank_config::ServerConfig;
//! use bank_server::{Bank, BankServer};
//! use std::sync::Arc;
//!
//! # async fn example() -> bank_server::Result<()> {
//! let config = ServerConfig::default();
//! let bank = Arc::new(Bank::new(config.exchange_rates.clone()));
//! let server = BankServer::bind(config, bank).await?;
//! server.run().await
//! # }
//! ```

pub mod domain;
pub mod error;
pub mod observers;
pub mod reply_cache;
pub mod server;
pub mod stats;

pub use domain::{AccountService, Bank, DomainResult};
pub use error::{Result, ServerError};
pub use observers::{Observer, ObserverRegistry};
pub use reply_cache::{CacheLookup, ReplyCache};
pub use server::{BankServer, Dispatch, Outcome};
pub use stats::{ServerStats, ServerStatsSnapshot};
