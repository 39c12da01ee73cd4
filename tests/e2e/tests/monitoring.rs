//! Monitoring registration and broadcast

use bank_client::MonitorUpdate;
use bank_e2e_tests::{TestConfig, TestFramework};
use std::time::Duration;
use types::{Currency, DomainFailure, Money};

#[tokio::test]
async fn test_monitor_receives_one_push_per_change() {
    let framework = TestFramework::start(TestConfig::default()).await.unwrap();
    let watcher = framework.client();
    let actor = framework.client();

    let account = actor
        .open_account("Ann", Currency::Sgd, "pw", Money::parse("10").unwrap())
        .await
        .unwrap();

    let mut updates = Vec::new();
    let session = watcher.monitor(Duration::from_millis(800), |update| updates.push(update));
    let change = async {
        framework.wait_for_observers(1).await.unwrap();
        actor
            .deposit("Ann", account.number, "pw", Currency::Sgd, Money::parse("5").unwrap())
            .await
            .unwrap()
    };
    let (pushes, deposited) = tokio::join!(session, change);

    assert_eq!(pushes.unwrap(), 1);
    assert_eq!(updates, vec![MonitorUpdate::Account(deposited)]);

    // Stop was acknowledged, so later changes reach nobody
    assert!(framework.server().observers().is_empty());
    let pushes_before = framework.server().stats().pushes_sent;
    actor
        .withdraw("Ann", account.number, "pw", Currency::Sgd, Money::parse("1").unwrap())
        .await
        .unwrap();
    assert_eq!(framework.server().stats().pushes_sent, pushes_before);
}

#[tokio::test]
async fn test_failures_are_broadcast() {
    let framework = TestFramework::start(TestConfig::default()).await.unwrap();
    let watcher = framework.client();
    let actor = framework.client();

    let account = actor
        .open_account("Ann", Currency::Sgd, "pw", Money::parse("1").unwrap())
        .await
        .unwrap();

    let mut updates = Vec::new();
    let session = watcher.monitor(Duration::from_millis(500), |update| updates.push(update));
    let change = async {
        framework.wait_for_observers(1).await.unwrap();
        actor
            .withdraw("Ann", account.number, "pw", Currency::Sgd, Money::parse("2").unwrap())
            .await
    };
    let (pushes, rejected) = tokio::join!(session, change);

    assert_eq!(
        rejected.unwrap_err().domain_failure(),
        Some(DomainFailure::Insufficient)
    );
    assert_eq!(pushes.unwrap(), 1);
    assert_eq!(updates, vec![MonitorUpdate::Failure(DomainFailure::Insufficient)]);
}
