//! End-to-End Test Framework for the bank RPC system
//!
//! Runs a real [`bank_server::BankServer`] on a loopback port and drives it
//! with [`bank_client::BankClient`] instances or raw envelopes, so every
//! scenario crosses the same UDP path a deployment does.

pub mod framework;

pub use framework::{init_tracing, TestConfig, TestFramework};
