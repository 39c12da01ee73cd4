//! In-memory account service
//!
//! All accounts live behind one mutex, so each operation (including both
//! legs of a transfer) is atomic with respect to every other. Amounts in a
//! foreign currency are converted `amount / rate(from) * rate(to)` and then
//! rounded half-up to cents.

use super::{AccountService, DomainResult};
use bank_config::ExchangeRates;
use codec::{BalanceQuery, CloseAccount, FundsMovement, OpenAccount, Transfer};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, error, warn};
use types::{AccountAction, AccountNumber, AccountSnapshot, Currency, DomainFailure, Money};

/// Random draws before falling back to the sequential scan
const RANDOM_ALLOCATION_ATTEMPTS: usize = 8;

#[derive(Debug, Clone)]
struct AccountRecord {
    number: AccountNumber,
    holder: String,
    password: String,
    currency: Currency,
    balance: Money,
    last_action: AccountAction,
}

impl AccountRecord {
    fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            number: self.number,
            holder: self.holder.clone(),
            currency: self.currency,
            balance: self.balance,
            action: self.last_action,
        }
    }

    fn authorize(&self, holder: &str, password: &str) -> DomainResult<()> {
        if self.holder == holder && self.password == password {
            Ok(())
        } else {
            Err(DomainFailure::Unauthorized)
        }
    }
}

/// Account-number allocator: a few random draws, then a monotonic scan
#[derive(Debug)]
struct Allocator {
    rng: StdRng,
    scan_cursor: u32,
}

impl Allocator {
    fn allocate(&mut self, taken: &HashMap<AccountNumber, AccountRecord>) -> Option<AccountNumber> {
        for _ in 0..RANDOM_ALLOCATION_ATTEMPTS {
            let candidate = self.rng.gen_range(AccountNumber::MIN..AccountNumber::MAX);
            if let Ok(number) = AccountNumber::new(candidate) {
                if !taken.contains_key(&number) {
                    return Some(number);
                }
            }
        }

        debug!("Random allocation collided, scanning from {}", self.scan_cursor);
        while self.scan_cursor <= AccountNumber::MAX {
            let candidate = self.scan_cursor;
            self.scan_cursor = self.scan_cursor.saturating_add(1);
            if let Ok(number) = AccountNumber::new(candidate) {
                if !taken.contains_key(&number) {
                    return Some(number);
                }
            }
            if candidate == AccountNumber::MAX {
                break;
            }
        }
        None
    }
}

pub struct Bank {
    accounts: Mutex<HashMap<AccountNumber, AccountRecord>>,
    allocator: Mutex<Allocator>,
    rates: ExchangeRates,
}

impl Bank {
    pub fn new(rates: ExchangeRates) -> Self {
        Self::with_rng(rates, StdRng::from_entropy())
    }

    /// Reproducible account numbers
    pub fn with_seed(rates: ExchangeRates, seed: u64) -> Self {
        Self::with_rng(rates, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rates: ExchangeRates, rng: StdRng) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            allocator: Mutex::new(Allocator {
                rng,
                scan_cursor: AccountNumber::MIN,
            }),
            rates,
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().len()
    }

    /// Convert into the account's currency and round to cents
    fn to_account_currency(&self, amount: Money, from: Currency, to: Currency) -> DomainResult<Money> {
        amount
            .convert(self.rates.rate(from), self.rates.rate(to))
            .map(Money::round_cents)
            .map_err(|e| {
                warn!("Conversion of {} {} into {} failed: {}", amount, from, to, e);
                DomainFailure::Insufficient
            })
    }
}

/// Movements must carry a strictly positive amount
fn require_positive(amount: Money) -> DomainResult<()> {
    if amount <= Money::ZERO {
        debug!("Rejected non-positive amount {}", amount);
        return Err(DomainFailure::Insufficient);
    }
    Ok(())
}

fn credit(record: &mut AccountRecord, amount: Money) -> DomainResult<()> {
    record.balance = record
        .balance
        .checked_add(amount)
        .ok_or(DomainFailure::Insufficient)?;
    Ok(())
}

fn debit(record: &mut AccountRecord, amount: Money) -> DomainResult<()> {
    if amount > record.balance {
        return Err(DomainFailure::Insufficient);
    }
    record.balance = record
        .balance
        .checked_sub(amount)
        .ok_or(DomainFailure::Insufficient)?;
    Ok(())
}

impl AccountService for Bank {
    fn open_account(&self, request: &OpenAccount) -> DomainResult<AccountSnapshot> {
        if request.initial_balance.is_negative() {
            debug!("Rejected negative opening balance {}", request.initial_balance);
            return Err(DomainFailure::Insufficient);
        }
        let mut accounts = self.accounts.lock();
        let number = self.allocator.lock().allocate(&accounts).ok_or_else(|| {
            error!("Account number space exhausted");
            DomainFailure::Insufficient
        })?;

        let record = AccountRecord {
            number,
            holder: request.holder.clone(),
            password: request.password.clone(),
            currency: request.currency,
            balance: request.initial_balance.round_cents(),
            last_action: AccountAction::Created,
        };
        let snapshot = record.snapshot();
        accounts.insert(number, record);
        debug!("Opened account {} for {}", number, request.holder);
        Ok(snapshot)
    }

    fn deposit(&self, request: &FundsMovement) -> DomainResult<AccountSnapshot> {
        let mut accounts = self.accounts.lock();
        let record = accounts
            .get_mut(&request.account)
            .ok_or(DomainFailure::NotFound)?;
        record.authorize(&request.holder, &request.password)?;
        require_positive(request.amount)?;

        let amount = self.to_account_currency(request.amount, request.currency, record.currency)?;
        credit(record, amount)?;
        record.last_action = AccountAction::Deposit;
        Ok(record.snapshot())
    }

    fn withdraw(&self, request: &FundsMovement) -> DomainResult<AccountSnapshot> {
        let mut accounts = self.accounts.lock();
        let record = accounts
            .get_mut(&request.account)
            .ok_or(DomainFailure::NotFound)?;
        record.authorize(&request.holder, &request.password)?;
        require_positive(request.amount)?;

        let amount = self.to_account_currency(request.amount, request.currency, record.currency)?;
        debit(record, amount)?;
        record.last_action = AccountAction::Withdrawal;
        Ok(record.snapshot())
    }

    fn transfer(&self, request: &Transfer) -> DomainResult<AccountSnapshot> {
        let mut accounts = self.accounts.lock();

        let source = accounts
            .get(&request.account)
            .ok_or(DomainFailure::NotFound)?;
        source.authorize(&request.holder, &request.password)?;
        require_positive(request.amount)?;
        let debited = self.to_account_currency(request.amount, request.currency, source.currency)?;
        if debited > source.balance {
            return Err(DomainFailure::Insufficient);
        }

        // A missing recipient fails before either balance moves
        let recipient = accounts.get(&request.recipient).ok_or_else(|| {
            debug!(
                "Transfer {} -> {} rejected: recipient not found",
                request.account, request.recipient
            );
            DomainFailure::NotFound
        })?;
        let credited =
            self.to_account_currency(request.amount, request.currency, recipient.currency)?;
        if recipient.balance.checked_add(credited).is_none() {
            return Err(DomainFailure::Insufficient);
        }

        if request.recipient != request.account {
            let recipient = accounts
                .get_mut(&request.recipient)
                .ok_or(DomainFailure::NotFound)?;
            credit(recipient, credited)?;
            recipient.last_action = AccountAction::TransferIn;
        }

        let source = accounts
            .get_mut(&request.account)
            .ok_or(DomainFailure::NotFound)?;
        if request.recipient != request.account {
            debit(source, debited)?;
        }
        source.last_action = AccountAction::TransferOut;
        Ok(source.snapshot())
    }

    fn close_account(&self, request: &CloseAccount) -> DomainResult<AccountSnapshot> {
        let mut accounts = self.accounts.lock();
        let record = accounts
            .get(&request.account)
            .ok_or(DomainFailure::NotFound)?;
        record.authorize(&request.holder, &request.password)?;

        let mut closed = accounts
            .remove(&request.account)
            .ok_or(DomainFailure::NotFound)?;
        closed.last_action = AccountAction::Closed;
        debug!("Closed account {}", request.account);
        Ok(closed.snapshot())
    }

    fn balance(&self, request: &BalanceQuery) -> DomainResult<AccountSnapshot> {
        let mut accounts = self.accounts.lock();
        let record = accounts
            .get_mut(&request.account)
            .ok_or(DomainFailure::NotFound)?;
        if record.password != request.password {
            return Err(DomainFailure::Unauthorized);
        }
        record.last_action = AccountAction::BalanceQuery;
        Ok(record.snapshot())
    }
}
