//! Duplicate handling under both invocation semantics

use bank_config::InvocationSemantics;
use bank_e2e_tests::{TestConfig, TestFramework};
use codec::{Envelope, FundsMovement, Reply, Request};
use rust_decimal_macros::dec;
use types::{Currency, Money};

#[tokio::test]
async fn test_at_most_once_replay_executes_once() {
    let framework = TestFramework::start(TestConfig::default()).await.unwrap();
    let client = framework.client();
    let account = client
        .open_account("John Smith", Currency::Nzd, "P@ssword", Money::parse("1000.00").unwrap())
        .await
        .unwrap();

    let deposit = Envelope::new(Request::Deposit(FundsMovement {
        holder: "John Smith".to_string(),
        account: account.number,
        password: "P@ssword".to_string(),
        currency: Currency::Nzd,
        amount: Money::parse("25").unwrap(),
    }));
    let replies = framework.replay(&deposit, 5).await.unwrap();

    assert_eq!(replies.len(), 5);
    assert!(replies.iter().all(|r| r == &replies[0]));
    match Reply::decode(&replies[0]).unwrap() {
        Reply::Account(snapshot) => assert_eq!(snapshot.balance.as_decimal(), dec!(1025.00)),
        other => panic!("unexpected reply {:?}", other),
    }

    let stats = framework.server().stats();
    assert_eq!(stats.executions, 2);
    assert_eq!(stats.cache_hits, 4);

    let balance = client.balance(account.number, "P@ssword").await.unwrap();
    assert_eq!(balance.balance.as_decimal(), dec!(1025.00));
}

#[tokio::test]
async fn test_at_least_once_replay_reexecutes() {
    let config = TestConfig::default().with_semantics(InvocationSemantics::AtLeastOnce);
    let framework = TestFramework::start(config).await.unwrap();
    let client = framework.client();
    let account = client
        .open_account("Ann", Currency::Sgd, "pw", Money::ZERO)
        .await
        .unwrap();

    let deposit = Envelope::new(Request::Deposit(FundsMovement {
        holder: "Ann".to_string(),
        account: account.number,
        password: "pw".to_string(),
        currency: Currency::Sgd,
        amount: Money::parse("7.25").unwrap(),
    }));
    let replies = framework.replay(&deposit, 4).await.unwrap();
    assert_eq!(replies.len(), 4);
    assert_ne!(replies[0], replies[3]);

    let balance = client.balance(account.number, "pw").await.unwrap();
    assert_eq!(balance.balance.as_decimal(), dec!(29.00));
    assert!(framework.server().cache().is_empty());
}
