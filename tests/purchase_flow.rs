//! Policy purchase end to end over mock wallet and contract.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{TxHash, U256};
use std::sync::Arc;
use std::time::Duration;

use defi_insurance::catalog::PlanId;
use defi_insurance::purchase::PurchaseError;
use defi_insurance::{AppError, InsuranceApp};

mod common;
use common::{build_app, test_config, MockContract, MockWallet, Settlement, ALICE};

fn purchase_error(err: AppError) -> PurchaseError {
    match err {
        AppError::Purchase(e) => e,
        other => panic!("expected purchase error, got {:?}", other),
    }
}

async fn connected_app(contract: Arc<MockContract>) -> InsuranceApp {
    let app = build_app(
        &test_config(),
        Some(Arc::new(MockWallet::with_account(ALICE))),
        Some(contract),
    )
    .await;
    app.connect().await.unwrap();
    app
}

#[tokio::test]
async fn test_not_connected_for_every_plan() {
    let contract = Arc::new(MockContract::new());
    let app = build_app(
        &test_config(),
        Some(Arc::new(MockWallet::with_account(ALICE))),
        Some(contract.clone()),
    )
    .await;

    for id in [1, 2, 3, 17] {
        let err = purchase_error(app.purchase(PlanId(id)).await.unwrap_err());
        assert!(matches!(err, PurchaseError::NotConnected));
    }
    assert!(contract.policy_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_contract() {
    let app = build_app(&test_config(), Some(Arc::new(MockWallet::with_account(ALICE))), None).await;
    app.connect().await.unwrap();

    let err = purchase_error(app.purchase(PlanId(1)).await.unwrap_err());
    assert!(matches!(err, PurchaseError::MisconfiguredContract));
}

#[tokio::test]
async fn test_unknown_plan() {
    let contract = Arc::new(MockContract::new());
    let app = connected_app(contract.clone()).await;

    for id in [0, 4, 1000] {
        let err = purchase_error(app.purchase(PlanId(id)).await.unwrap_err());
        assert!(matches!(err, PurchaseError::InvalidPlan(p) if p == PlanId(id)));
    }
    assert_eq!(contract.subscriptions_opened(), 0);
}

#[tokio::test]
async fn test_purchase_sends_the_plan_with_that_id() {
    let contract = Arc::new(MockContract::new().with_settlement(Settlement::Confirmed(4242)));
    let app = connected_app(contract.clone()).await;

    let receipt = app.purchase(PlanId(2)).await.unwrap();
    assert_eq!(receipt.plan_id, PlanId(2));
    assert_eq!(receipt.block_number, 4242);

    let requests = contract.policy_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let (holder, request) = &requests[0];
    assert_eq!(*holder, ALICE);
    assert_eq!(request.coverage, U256::from(3));
    assert_eq!(request.premium_wei, parse_ether("200").unwrap());
    assert_eq!(request.duration_days, 30);
    assert_eq!(request.policy_type, 1);

    let event = receipt.event.expect("PolicyCreated event");
    assert_eq!(event.holder, ALICE);
    assert_eq!(event.coverage, U256::from(3));
    assert_eq!(event.tx_hash, Some(receipt.tx_hash));
}

#[tokio::test]
async fn test_purchase_updates_owned_and_releases_subscription() {
    let contract = Arc::new(MockContract::new().with_owned(&[1]));
    let app = connected_app(contract.clone()).await;

    app.purchase(PlanId(3)).await.unwrap();

    assert!(app.session().owns(PlanId(1)));
    assert!(app.session().owns(PlanId(3)));
    assert_eq!(contract.subscriptions_opened(), 1);
    assert!(contract.subscriptions_released());
}

#[tokio::test]
async fn test_missing_event_is_not_fatal() {
    let contract = Arc::new(MockContract::new().silent());
    let app = connected_app(contract.clone()).await;

    let receipt = app.purchase(PlanId(1)).await.unwrap();
    assert!(receipt.event.is_none());
    assert!(contract.subscriptions_released());
    assert!(app.session().owns(PlanId(1)));
}

#[tokio::test]
async fn test_concurrent_purchase_of_same_plan_is_in_flight() {
    let contract = Arc::new(MockContract::new().with_settle_delay(Duration::from_millis(200)));
    let app = connected_app(contract.clone()).await;

    let (first, second) = tokio::join!(app.purchase(PlanId(2)), app.purchase(PlanId(2)));

    let outcomes = [first, second];
    let done = outcomes.iter().filter(|r| r.is_ok()).count();
    let in_flight = outcomes
        .iter()
        .filter(|r| matches!(r, Err(AppError::Purchase(PurchaseError::InFlight(PlanId(2))))))
        .count();
    assert_eq!(done, 1);
    assert_eq!(in_flight, 1);
    assert_eq!(contract.policy_requests.lock().unwrap().len(), 1);

    // Slot is free again once the first purchase finished.
    app.purchase(PlanId(2)).await.unwrap();
}

#[tokio::test]
async fn test_different_plans_may_run_together() {
    let contract = Arc::new(MockContract::new().with_settle_delay(Duration::from_millis(100)));
    let app = connected_app(contract.clone()).await;

    let (a, b) = tokio::join!(app.purchase(PlanId(1)), app.purchase(PlanId(3)));
    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(contract.policy_requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_purchases_keep_their_own_events() {
    let contract = Arc::new(MockContract::new().with_settle_delay(Duration::from_millis(50)));
    let app = connected_app(contract.clone()).await;

    let (a, b) = tokio::join!(app.purchase(PlanId(1)), app.purchase(PlanId(3)));
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.tx_hash, b.tx_hash);

    for receipt in [&a, &b] {
        let event = receipt.event.as_ref().expect("PolicyCreated event");
        assert_eq!(event.tx_hash, Some(receipt.tx_hash));
    }
    assert_eq!(a.event.unwrap().coverage, U256::from(400));
    assert_eq!(b.event.unwrap().coverage, U256::from(100_000));
    assert!(contract.subscriptions_released());
}

#[tokio::test]
async fn test_events_from_other_transactions_are_skipped() {
    let contract = Arc::new(MockContract::new().with_foreign_event());
    let app = connected_app(contract).await;

    let receipt = app.purchase(PlanId(2)).await.unwrap();
    let event = receipt.event.expect("PolicyCreated event");
    assert_eq!(event.tx_hash, Some(receipt.tx_hash));
    assert_ne!(event.policy_id, U256::from(999));
}

#[tokio::test]
async fn test_reverted_transaction() {
    let contract = Arc::new(
        MockContract::new().with_settlement(Settlement::Reverted("insufficient premium".into())),
    );
    let app = connected_app(contract.clone()).await;

    let err = purchase_error(app.purchase(PlanId(1)).await.unwrap_err());
    assert!(matches!(&err, PurchaseError::TransactionReverted(r) if r == "insufficient premium"));
    assert!(!err.is_retryable());
    assert!(!app.session().owns(PlanId(1)));
    assert!(contract.subscriptions_released());

    // The failed attempt must not hold the slot.
    let err = purchase_error(app.purchase(PlanId(1)).await.unwrap_err());
    assert!(matches!(err, PurchaseError::TransactionReverted(_)));
}

#[tokio::test]
async fn test_rejected_submission() {
    let contract = Arc::new(MockContract::new().rejecting("user denied transaction signature"));
    let app = connected_app(contract.clone()).await;

    let err = purchase_error(app.purchase(PlanId(2)).await.unwrap_err());
    assert!(matches!(&err, PurchaseError::TransactionRejected(r) if r.contains("user denied")));
    assert!(err.is_retryable());
    assert!(contract.subscriptions_released());
}

#[tokio::test]
async fn test_confirmation_timeout() {
    let contract = Arc::new(MockContract::new().with_settlement(Settlement::TimedOut));
    let app = connected_app(contract).await;

    let err = purchase_error(app.purchase(PlanId(3)).await.unwrap_err());
    assert!(matches!(err, PurchaseError::TimedOut(1)));
    assert!(!app.session().owns(PlanId(3)));
}

#[tokio::test]
async fn test_receipt_poll_failure_is_not_retryable() {
    let contract = Arc::new(
        MockContract::new().with_settlement(Settlement::RpcFailure("connection reset by peer".into())),
    );
    let app = connected_app(contract.clone()).await;

    let err = purchase_error(app.purchase(PlanId(2)).await.unwrap_err());
    assert_eq!(contract.policy_requests.lock().unwrap().len(), 1);
    assert!(matches!(
        &err,
        PurchaseError::ConfirmationUnknown { tx_hash, reason }
            if *tx_hash == TxHash::with_last_byte(1) && reason.contains("connection reset")
    ));
    assert!(!err.is_retryable());
    assert!(!app.session().owns(PlanId(2)));
    assert!(contract.subscriptions_released());
}
