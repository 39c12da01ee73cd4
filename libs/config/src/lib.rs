//! # Bank Service Configuration
//!
//! Configuration for the bank server and client binaries: defaults,
//! optional TOML files and `BANK_SERVER_*` / `BANK_CLIENT_*` environment
//! overrides.
//!
//! ## Usage
//!
//! ```rust
//! use bank_config::{InvocationSemantics, ServerConfig};
//!
//! let config = ServerConfig::default();
//! assert_eq!(config.port, 6789);
//! assert_eq!(config.semantics, InvocationSemantics::AtMostOnce);
//! ```

pub mod semantics;
pub mod service_config;

// Re-export commonly used types
pub use semantics::InvocationSemantics;
pub use service_config::{
    ClientConfig, ExchangeRates, ServerConfig, CLIENT_ENV_PREFIX, SERVER_ENV_PREFIX,
};
