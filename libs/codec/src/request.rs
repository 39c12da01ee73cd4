//! Per-opcode request schema
//!
//! Field order is fixed per opcode and shared by both ends out of band;
//! nothing self-describing travels on the wire. Account numbers, amounts
//! and currencies are carried as string fields.
//!
//! | Opcode | Fields |
//! |---|---|
//! | create (1) | name, currency, password, initial amount |
//! | deposit (2), withdraw (3) | name, account, password, currency, amount |
//! | close (4) | account, name, password |
//! | transfer (5) | name, account, password, recipient, currency, amount |
//! | start-monitor (6), stop-monitor (8) | none |
//! | balance-query (7) | account, password |

use crate::builder::WireWriter;
use crate::error::{ProtocolError, ProtocolResult};
use crate::parser::WireReader;
use types::{AccountNumber, Currency, Money, Opcode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAccount {
    pub holder: String,
    pub currency: Currency,
    pub password: String,
    pub initial_balance: Money,
}

/// Deposit or withdrawal, in any supported currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundsMovement {
    pub holder: String,
    pub account: AccountNumber,
    pub password: String,
    pub currency: Currency,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseAccount {
    pub account: AccountNumber,
    pub holder: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub holder: String,
    pub account: AccountNumber,
    pub password: String,
    pub recipient: AccountNumber,
    pub currency: Currency,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceQuery {
    pub account: AccountNumber,
    pub password: String,
}

/// Every operation a client can invoke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    OpenAccount(OpenAccount),
    Deposit(FundsMovement),
    Withdraw(FundsMovement),
    CloseAccount(CloseAccount),
    Transfer(Transfer),
    StartMonitoring,
    BalanceQuery(BalanceQuery),
    StopMonitoring,
}

impl Request {
    pub fn opcode(&self) -> Opcode {
        match self {
            Request::OpenAccount(_) => Opcode::CreateAccount,
            Request::Deposit(_) => Opcode::Deposit,
            Request::Withdraw(_) => Opcode::Withdraw,
            Request::CloseAccount(_) => Opcode::CloseAccount,
            Request::Transfer(_) => Opcode::Transfer,
            Request::StartMonitoring => Opcode::StartMonitoring,
            Request::BalanceQuery(_) => Opcode::BalanceQuery,
            Request::StopMonitoring => Opcode::StopMonitoring,
        }
    }

    /// Append this request's fields in schema order
    pub fn write_fields(&self, writer: &mut WireWriter) {
        match self {
            Request::OpenAccount(open) => {
                writer
                    .put_str(&open.holder)
                    .put_str(open.currency.code())
                    .put_str(&open.password)
                    .put_display(open.initial_balance.as_decimal());
            }
            Request::Deposit(movement) | Request::Withdraw(movement) => {
                writer
                    .put_str(&movement.holder)
                    .put_display(movement.account)
                    .put_str(&movement.password)
                    .put_str(movement.currency.code())
                    .put_display(movement.amount.as_decimal());
            }
            Request::CloseAccount(close) => {
                writer
                    .put_display(close.account)
                    .put_str(&close.holder)
                    .put_str(&close.password);
            }
            Request::Transfer(transfer) => {
                writer
                    .put_str(&transfer.holder)
                    .put_display(transfer.account)
                    .put_str(&transfer.password)
                    .put_display(transfer.recipient)
                    .put_str(transfer.currency.code())
                    .put_display(transfer.amount.as_decimal());
            }
            Request::BalanceQuery(query) => {
                writer
                    .put_display(query.account)
                    .put_str(&query.password);
            }
            Request::StartMonitoring | Request::StopMonitoring => {}
        }
    }

    /// Decode the fields that follow an envelope header
    ///
    /// Amounts are taken exactly as sent; rounding belongs to the account service.
    pub fn read_fields(opcode: Opcode, reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        let request = match opcode {
            Opcode::CreateAccount => Request::OpenAccount(OpenAccount {
                holder: reader.read_string()?,
                currency: reader.read_parsed("currency")?,
                password: reader.read_string()?,
                initial_balance: reader.read_parsed("initial amount")?,
            }),
            Opcode::Deposit => Request::Deposit(read_movement(reader)?),
            Opcode::Withdraw => Request::Withdraw(read_movement(reader)?),
            Opcode::CloseAccount => Request::CloseAccount(CloseAccount {
                account: reader.read_parsed("account number")?,
                holder: reader.read_string()?,
                password: reader.read_string()?,
            }),
            Opcode::Transfer => Request::Transfer(Transfer {
                holder: reader.read_string()?,
                account: reader.read_parsed("account number")?,
                password: reader.read_string()?,
                recipient: reader.read_parsed("recipient account number")?,
                currency: reader.read_parsed("currency")?,
                amount: reader.read_parsed("amount")?,
            }),
            Opcode::StartMonitoring => Request::StartMonitoring,
            Opcode::BalanceQuery => Request::BalanceQuery(BalanceQuery {
                account: reader.read_parsed("account number")?,
                password: reader.read_string()?,
            }),
            Opcode::StopMonitoring => Request::StopMonitoring,
            Opcode::CachedReply => {
                return Err(ProtocolError::ReservedOpcode {
                    opcode: opcode.code(),
                })
            }
        };
        Ok(request)
    }
}

fn read_movement(reader: &mut WireReader<'_>) -> ProtocolResult<FundsMovement> {
    Ok(FundsMovement {
        holder: reader.read_string()?,
        account: reader.read_parsed("account number")?,
        password: reader.read_string()?,
        currency: reader.read_parsed("currency")?,
        amount: reader.read_parsed("amount")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;

    #[test]
    fn test_amount_is_sent_unrounded() {
        let request = Request::Deposit(FundsMovement {
            holder: "Ann".to_string(),
            account: AccountNumber::new(1_234_567_890).unwrap(),
            password: "pw".to_string(),
            currency: Currency::Usd,
            amount: Money::parse("10.005").unwrap(),
        });
        let bytes = Envelope::new(request.clone()).encode().unwrap();
        let decoded = Envelope::decode(&bytes).unwrap();
        assert_eq!(decoded.request, request);
        match decoded.request {
            Request::Deposit(movement) => assert_eq!(movement.amount.as_decimal().to_string(), "10.005"),
            other => panic!("expected deposit, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_account_number_is_framing_error() {
        let mut writer = WireWriter::new();
        writer.put_str("12ab").put_str("pw");
        let bytes = writer.finish();
        let mut reader = WireReader::new(&bytes);
        let err = Request::read_fields(Opcode::BalanceQuery, &mut reader).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidField { field: "account number", .. }
        ));
    }

    #[test]
    fn test_missing_fields_are_truncation() {
        let mut writer = WireWriter::new();
        writer.put_str("1234567890");
        let bytes = writer.finish();
        let mut reader = WireReader::new(&bytes);
        assert!(matches!(
            Request::read_fields(Opcode::BalanceQuery, &mut reader),
            Err(ProtocolError::MessageTooSmall { .. })
        ));
    }
}
