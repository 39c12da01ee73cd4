//! # Bank Client
//!
//! Typed front end to the bank server. [`BankClient`] turns each account
//! operation into one retried invocation and narrows replies to
//! [`types::AccountSnapshot`]; [`messages`] renders results and domain
//! failures for people.
//!
//! ```rust,no_run
//! use bank_client::BankClient;
//! use network::RpcClientConfig;
//! use types::{Currency, Money};
//!
//! # async fn example() -> network::RpcResult<()> {
//! let client = BankClient::new(RpcClientConfig::default());
//! let opened = client
//!     .open_account("John Smith", Currency::Nzd, "P@ssword", Money::parse("1000").unwrap())
//!     .await?;
//! println!("{}", bank_client::messages::render_snapshot(&opened));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod messages;

pub use client::BankClient;
pub use messages::{describe_error, render_snapshot, render_update, status_message};
pub use network::MonitorUpdate;
