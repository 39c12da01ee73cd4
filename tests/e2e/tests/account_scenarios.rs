//! Account operations end to end

use bank_client::describe_error;
use bank_e2e_tests::{TestConfig, TestFramework};
use network::RpcError;
use rust_decimal_macros::dec;
use types::{AccountAction, AccountNumber, Currency, DomainFailure, Money};

fn money(s: &str) -> Money {
    Money::parse(s).unwrap()
}

#[tokio::test]
async fn test_cross_currency_deposit() {
    let framework = TestFramework::start(TestConfig::default()).await.unwrap();
    let client = framework.client();

    let opened = client
        .open_account("John Smith", Currency::Nzd, "P@ssword", money("1000.00"))
        .await
        .unwrap();
    assert_eq!(opened.currency, Currency::Nzd);
    assert_eq!(opened.balance.as_decimal(), dec!(1000.00));
    assert_eq!(opened.action, AccountAction::Created);

    let after = client
        .deposit("John Smith", opened.number, "P@ssword", Currency::Sgd, money("50.00"))
        .await
        .unwrap();
    assert_eq!(after.balance.as_decimal(), dec!(1053.50));
    assert_eq!(after.action, AccountAction::Deposit);
}

#[tokio::test]
async fn test_insufficient_funds_leaves_balance() {
    let framework = TestFramework::start(TestConfig::default()).await.unwrap();
    let client = framework.client();
    let account = client
        .open_account("Ann", Currency::Usd, "pw", money("20"))
        .await
        .unwrap();

    let err = client
        .withdraw("Ann", account.number, "pw", Currency::Usd, money("20.01"))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Domain(DomainFailure::Insufficient)));

    let balance = client.balance(account.number, "pw").await.unwrap();
    assert_eq!(balance.balance.as_decimal(), dec!(20.00));
    assert_eq!(balance.action, AccountAction::BalanceQuery);
}

#[tokio::test]
async fn test_transfer_to_missing_account() {
    let framework = TestFramework::start(TestConfig::default()).await.unwrap();
    let client = framework.client();
    let source = client
        .open_account("Ann", Currency::Sgd, "pw", money("100"))
        .await
        .unwrap();
    let missing = AccountNumber::new(2_000_000_000).unwrap();

    let err = client
        .transfer("Ann", source.number, "pw", missing, Currency::Sgd, money("40"))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Domain(DomainFailure::NotFound)));

    let balance = client.balance(source.number, "pw").await.unwrap();
    assert_eq!(balance.balance.as_decimal(), dec!(100.00));
}

#[tokio::test]
async fn test_transfer_between_accounts() {
    let framework = TestFramework::start(TestConfig::default()).await.unwrap();
    let client = framework.client();
    let ann = client
        .open_account("Ann", Currency::Sgd, "pw", money("100"))
        .await
        .unwrap();
    let bob = client
        .open_account("Bob", Currency::Usd, "secret", money("0"))
        .await
        .unwrap();

    let source = client
        .transfer("Ann", ann.number, "pw", bob.number, Currency::Sgd, money("50"))
        .await
        .unwrap();
    assert_eq!(source.balance.as_decimal(), dec!(50.00));
    assert_eq!(source.action, AccountAction::TransferOut);

    let recipient = client.balance(bob.number, "secret").await.unwrap();
    assert_eq!(recipient.balance.as_decimal(), dec!(37.00));
}

#[tokio::test]
async fn test_wrong_credentials_and_closure() {
    let framework = TestFramework::start(TestConfig::default()).await.unwrap();
    let client = framework.client();
    let account = client
        .open_account("Ann", Currency::Sgd, "pw", money("5"))
        .await
        .unwrap();

    let err = client
        .close_account(account.number, "Ann", "guess")
        .await
        .unwrap_err();
    assert_eq!(
        describe_error(&err),
        "Authentication failed: name or password is incorrect"
    );

    let closed = client
        .close_account(account.number, "Ann", "pw")
        .await
        .unwrap();
    assert_eq!(closed.action, AccountAction::Closed);

    let err = client.balance(account.number, "pw").await.unwrap_err();
    assert!(matches!(err, RpcError::Domain(DomainFailure::NotFound)));
}
