//! Typed bank operations over [`RpcClient`]
//!
//! Each method builds one request, runs it through the retrying
//! invocation loop and narrows the reply to the account projection.

use anyhow::Context;
use bank_config::ClientConfig;
use codec::{
    BalanceQuery, CloseAccount, FundsMovement, OpenAccount, ProtocolError, Reply, Request,
    Transfer,
};
use network::{ClientStats, MonitorUpdate, RpcClient, RpcClientConfig, RpcError, RpcResult};
use std::time::Duration;
use tracing::debug;
use types::{AccountNumber, AccountSnapshot, Currency, Money};

#[derive(Debug)]
pub struct BankClient {
    rpc: RpcClient,
}

impl BankClient {
    pub fn new(config: RpcClientConfig) -> Self {
        Self {
            rpc: RpcClient::new(config),
        }
    }

    /// Build from loaded client settings, resolving the server address
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let server_address = config
            .server_socket_addr()
            .context("Invalid server address")?;
        Ok(Self::new(RpcClientConfig {
            server_address,
            buffer_size: config.buffer_size,
            retry_timeout: config.retry_timeout(),
            loss_probability: config.loss_probability,
            loss_seed: config.loss_seed,
            monitor_poll: config.monitor_poll(),
        }))
    }

    pub fn stats(&self) -> ClientStats {
        self.rpc.stats()
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    async fn account_call(&self, request: Request) -> RpcResult<AccountSnapshot> {
        let opcode = request.opcode();
        match self.rpc.invoke(request).await? {
            Reply::Account(snapshot) => {
                debug!("{} succeeded for account {}", opcode, snapshot.number);
                Ok(snapshot)
            }
            Reply::Ack => Err(RpcError::Protocol(ProtocolError::unexpected_reply(format!(
                "bare acknowledgement for {}",
                opcode
            )))),
            Reply::Failure(failure) => Err(RpcError::Domain(failure)),
        }
    }

    pub async fn open_account(
        &self,
        holder: &str,
        currency: Currency,
        password: &str,
        initial_balance: Money,
    ) -> RpcResult<AccountSnapshot> {
        self.account_call(Request::OpenAccount(OpenAccount {
            holder: holder.to_string(),
            currency,
            password: password.to_string(),
            initial_balance,
        }))
        .await
    }

    pub async fn deposit(
        &self,
        holder: &str,
        account: AccountNumber,
        password: &str,
        currency: Currency,
        amount: Money,
    ) -> RpcResult<AccountSnapshot> {
        self.account_call(Request::Deposit(FundsMovement {
            holder: holder.to_string(),
            account,
            password: password.to_string(),
            currency,
            amount,
        }))
        .await
    }

    pub async fn withdraw(
        &self,
        holder: &str,
        account: AccountNumber,
        password: &str,
        currency: Currency,
        amount: Money,
    ) -> RpcResult<AccountSnapshot> {
        self.account_call(Request::Withdraw(FundsMovement {
            holder: holder.to_string(),
            account,
            password: password.to_string(),
            currency,
            amount,
        }))
        .await
    }

    /// Returns the source account after the transfer
    pub async fn transfer(
        &self,
        holder: &str,
        account: AccountNumber,
        password: &str,
        recipient: AccountNumber,
        currency: Currency,
        amount: Money,
    ) -> RpcResult<AccountSnapshot> {
        self.account_call(Request::Transfer(Transfer {
            holder: holder.to_string(),
            account,
            password: password.to_string(),
            recipient,
            currency,
            amount,
        }))
        .await
    }

    pub async fn close_account(
        &self,
        account: AccountNumber,
        holder: &str,
        password: &str,
    ) -> RpcResult<AccountSnapshot> {
        self.account_call(Request::CloseAccount(CloseAccount {
            account,
            holder: holder.to_string(),
            password: password.to_string(),
        }))
        .await
    }

    pub async fn balance(&self, account: AccountNumber, password: &str) -> RpcResult<AccountSnapshot> {
        self.account_call(Request::BalanceQuery(BalanceQuery {
            account,
            password: password.to_string(),
        }))
        .await
    }

    /// Watch every broadcast reply for `duration`
    pub async fn monitor<F>(&self, duration: Duration, on_update: F) -> RpcResult<u64>
    where
        F: FnMut(MonitorUpdate) + Send,
    {
        self.rpc.monitor(duration, on_update).await
    }
}
