//! Progress under injected loss

use bank_config::InvocationSemantics;
use bank_e2e_tests::{TestConfig, TestFramework};
use rust_decimal::Decimal;
use types::{Currency, Money};

const DEPOSITS: u32 = 10;

#[tokio::test]
async fn test_at_most_once_survives_loss_exactly() {
    let config = TestConfig::default()
        .with_server_loss(0.3, 5)
        .with_client_loss(0.3, 9);
    let framework = TestFramework::start(config).await.unwrap();
    let client = framework.client();

    let account = client
        .open_account("Ann", Currency::Sgd, "pw", Money::ZERO)
        .await
        .unwrap();
    for _ in 0..DEPOSITS {
        client
            .deposit("Ann", account.number, "pw", Currency::Sgd, Money::parse("1").unwrap())
            .await
            .unwrap();
    }

    let balance = framework
        .reliable_client()
        .balance(account.number, "pw")
        .await
        .unwrap();
    assert_eq!(balance.balance.as_decimal(), Decimal::from(DEPOSITS));

    let stats = framework.server().stats();
    assert_eq!(stats.executions, u64::from(DEPOSITS) + 2);
    assert!(stats.replies_dropped + client.stats().dropped_replies > 0);
}

#[tokio::test]
async fn test_at_least_once_loss_reapplies() {
    let config = TestConfig::default()
        .with_semantics(InvocationSemantics::AtLeastOnce)
        .with_client_loss(0.5, 3);
    let framework = TestFramework::start(config).await.unwrap();
    let client = framework.client();

    let account = client
        .open_account("Ann", Currency::Sgd, "pw", Money::ZERO)
        .await
        .unwrap();
    let opens = framework.server().stats().executions;

    for _ in 0..DEPOSITS {
        client
            .deposit("Ann", account.number, "pw", Currency::Sgd, Money::parse("1").unwrap())
            .await
            .unwrap();
    }
    let deposits_executed = framework.server().stats().executions - opens;
    assert!(deposits_executed >= u64::from(DEPOSITS));

    let balance = framework
        .reliable_client()
        .balance(account.number, "pw")
        .await
        .unwrap();
    assert_eq!(balance.balance.as_decimal(), Decimal::from(deposits_executed));
}
