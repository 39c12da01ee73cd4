//! Account service seam
//!
//! The dispatcher only needs this narrow contract: hand over a decoded
//! request, get back the account projection or a typed failure. The
//! service never sees sockets and never triggers sends itself; broadcasting
//! is decided by the dispatcher after the call returns.

pub mod bank;

use codec::{BalanceQuery, CloseAccount, FundsMovement, OpenAccount, Transfer};
use types::{AccountSnapshot, DomainFailure};

pub use bank::Bank;

pub type DomainResult<T> = std::result::Result<T, DomainFailure>;

/// Account operations reachable through opcode dispatch
pub trait AccountService: Send + Sync {
    fn open_account(&self, request: &OpenAccount) -> DomainResult<AccountSnapshot>;

    fn deposit(&self, request: &FundsMovement) -> DomainResult<AccountSnapshot>;

    fn withdraw(&self, request: &FundsMovement) -> DomainResult<AccountSnapshot>;

    /// Returns the source account's projection
    fn transfer(&self, request: &Transfer) -> DomainResult<AccountSnapshot>;

    /// Returns the account as it was when closed
    fn close_account(&self, request: &CloseAccount) -> DomainResult<AccountSnapshot>;

    fn balance(&self, request: &BalanceQuery) -> DomainResult<AccountSnapshot>;
}
