//! Status-first replies
//!
//! Every reply starts with the status code as a string field. A successful
//! account operation follows it with the account projection; a monitor
//! control ack and every failure are the status field alone. The same bytes
//! go to the caller and, for every account operation, to every registered
//! observer.

use crate::builder::WireWriter;
use crate::error::{ProtocolError, ProtocolResult};
use crate::parser::WireReader;
use bytes::Bytes;
use types::{AccountSnapshot, DomainFailure, StatusCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `200` followed by number, holder, currency, balance, last action
    Account(AccountSnapshot),
    /// `200` alone, acknowledging a monitor control request
    Ack,
    /// Non-`200` status alone
    Failure(DomainFailure),
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Account(_) | Reply::Ack => StatusCode::Ok,
            Reply::Failure(failure) => failure.status(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status().is_ok()
    }

    pub fn encode(&self) -> Bytes {
        let mut writer = WireWriter::with_capacity(64);
        writer.put_display(self.status().code());
        if let Reply::Account(account) = self {
            writer
                .put_display(account.number)
                .put_str(&account.holder)
                .put_str(account.currency.code())
                .put_display(account.balance)
                .put_str(account.action.label());
        }
        writer.finish()
    }

    pub fn decode(buf: &[u8]) -> ProtocolResult<Self> {
        let mut reader = WireReader::new(buf);
        let raw_status: i32 = reader.read_parsed("status")?;
        let status = StatusCode::try_from(raw_status)?;

        if let Some(failure) = DomainFailure::from_status(status) {
            return Ok(Reply::Failure(failure));
        }
        if reader.is_exhausted() {
            return Ok(Reply::Ack);
        }

        let account = AccountSnapshot {
            number: reader.read_parsed("account number")?,
            holder: reader.read_string()?,
            currency: reader.read_parsed("currency")?,
            balance: reader.read_parsed("balance")?,
            action: reader.read_parsed("action")?,
        };
        if !reader.is_exhausted() {
            return Err(ProtocolError::unexpected_reply(format!(
                "{} trailing bytes after account projection",
                reader.remaining()
            )));
        }
        Ok(Reply::Account(account))
    }
}

impl From<DomainFailure> for Reply {
    fn from(failure: DomainFailure) -> Self {
        Reply::Failure(failure)
    }
}
