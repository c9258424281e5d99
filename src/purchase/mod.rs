//! Policy purchase flow.
//!
//! # Data Flow
//! ```text
//! purchase(session, plan_id)
//!     → checks (connected, contract, plan exists, not already in flight)
//!     → PolicySubscription (PolicyCreated for the holder)
//!     → ContractClient::create_policy (premium attached as value)
//!     → ContractClient::wait_for_confirmation
//!     → PolicyCreated event for that tx hash (bounded wait), subscription released
//!     → owned set refreshed and stored in the session
//! ```
//!
//! # Design Decisions
//! - Plans are resolved by their `id` field, never by list position
//! - Nothing is retried automatically; `PurchaseError::is_retryable` tells
//!   the caller whether asking again makes sense
//! - A missing `PolicyCreated` event after a confirmed receipt is logged,
//!   not treated as failure

pub mod guard;
pub mod types;

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::{
    ConfirmationStatus, ContractClient, PolicyCreatedEvent, PolicyRequest, PolicySubscription,
};
use crate::catalog::{InsurancePlan, PlanCatalog, PlanId};
use crate::config::InsuranceConfig;
use crate::format::format_eth;
use crate::observability::metrics;
use crate::session::{Account, Session};

pub use guard::{InFlightGuard, InFlightTable};
pub use types::{PurchaseError, PurchaseReceipt};

/// Buys insurance plans through the contract client.
pub struct PolicyPurchaseFlow {
    catalog: Arc<PlanCatalog>,
    contract: Option<Arc<dyn ContractClient>>,
    in_flight: InFlightTable,
    policy_type: u8,
    event_timeout: Duration,
    confirmation_timeout_secs: u64,
}

impl PolicyPurchaseFlow {
    pub fn new(
        catalog: Arc<PlanCatalog>,
        contract: Option<Arc<dyn ContractClient>>,
        config: &InsuranceConfig,
    ) -> Self {
        Self {
            catalog,
            contract,
            in_flight: InFlightTable::new(),
            policy_type: config.contract.policy_type,
            event_timeout: Duration::from_secs(config.contract.event_timeout_secs),
            confirmation_timeout_secs: config.blockchain.confirmation_timeout_secs,
        }
    }

    /// Purchases currently running.
    pub fn in_flight(&self) -> &InFlightTable {
        &self.in_flight
    }

    /// Buy `plan_id` for the session's account.
    pub async fn purchase(&self, session: &Session, plan_id: PlanId) -> Result<PurchaseReceipt, PurchaseError> {
        let operation_id = Uuid::new_v4();
        let span = tracing::info_span!("purchase", %operation_id, %plan_id);

        let result = self.run(session, plan_id).instrument(span).await;
        match &result {
            Ok(_) => metrics::record_purchase("confirmed"),
            Err(e) => metrics::record_purchase(e.outcome()),
        }
        result
    }

    async fn run(&self, session: &Session, plan_id: PlanId) -> Result<PurchaseReceipt, PurchaseError> {
        let account = session.account().ok_or(PurchaseError::NotConnected)?;
        let contract = self.contract.as_ref().ok_or(PurchaseError::MisconfiguredContract)?;
        let plan = self
            .catalog
            .find_plan(plan_id)
            .ok_or(PurchaseError::InvalidPlan(plan_id))?;
        let _slot = self
            .in_flight
            .try_acquire(account.address(), plan_id)
            .ok_or(PurchaseError::InFlight(plan_id))?;

        let request = policy_request(&plan, self.policy_type)?;
        let holder = account.address();

        let subscription = match contract.watch_policy_created(holder).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                tracing::warn!(error = %e, "PolicyCreated subscription unavailable");
                None
            }
        };

        tracing::info!(
            account = %account,
            plan = %plan.name,
            premium_eth = %format_eth(request.premium_wei),
            "Purchasing policy"
        );

        let tx_hash = contract.create_policy(holder, &request).await?;
        tracing::info!(tx_hash = %tx_hash, "Policy transaction submitted");

        let status = contract
            .wait_for_confirmation(tx_hash)
            .await
            .map_err(|e| PurchaseError::after_broadcast(tx_hash, e))?;
        let block_number = match status {
            ConfirmationStatus::Confirmed { block_number } => block_number,
            ConfirmationStatus::Failed(reason) => return Err(PurchaseError::TransactionReverted(reason)),
            ConfirmationStatus::Pending | ConfirmationStatus::Confirming { .. } => {
                return Err(PurchaseError::TimedOut(self.confirmation_timeout_secs))
            }
        };
        tracing::info!(tx_hash = %tx_hash, block_number, "Policy transaction confirmed");

        let event = match subscription {
            Some(subscription) => self.first_event(subscription, tx_hash).await,
            None => None,
        };

        self.refresh_owned(session, &account, plan_id).await;

        Ok(PurchaseReceipt {
            plan_id,
            tx_hash,
            block_number,
            event,
        })
    }

    /// Wait for the event emitted by `tx_hash`, then let the subscription go.
    ///
    /// Events from the holder's other transactions are skipped; the wait
    /// window covers the whole search, not each event.
    async fn first_event(&self, mut subscription: PolicySubscription, tx_hash: TxHash) -> Option<PolicyCreatedEvent> {
        let deadline = Instant::now() + self.event_timeout;
        let mut event = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match subscription.next_event(remaining).await {
                Some(candidate) if candidate.tx_hash == Some(tx_hash) => {
                    event = Some(candidate);
                    break;
                }
                Some(other) => tracing::debug!(
                    policy_id = %other.policy_id,
                    other_tx = ?other.tx_hash,
                    "Skipping PolicyCreated event from another transaction"
                ),
                None => break,
            }
        }
        drop(subscription);

        match &event {
            Some(event) => tracing::info!(
                policy_id = %event.policy_id,
                holder = %event.holder,
                coverage = %event.coverage,
                "Policy created"
            ),
            None => tracing::warn!(
                wait_secs = self.event_timeout.as_secs(),
                "No PolicyCreated event within the wait window"
            ),
        }
        event
    }

    async fn refresh_owned(&self, session: &Session, account: &Account, plan_id: PlanId) {
        let mut owned = match self.catalog.list_owned(Some(account)).await {
            Ok(owned) => owned,
            Err(e) => {
                tracing::warn!(error = %e, "Owned policy refresh failed; keeping local set");
                session.owned()
            }
        };
        owned.insert(plan_id);

        // The user may have switched accounts while the transaction confirmed.
        if session.account().as_ref() == Some(account) {
            session.set_owned(owned);
        }
    }
}

/// Translate a catalog plan into `createPolicy` arguments.
pub fn policy_request(plan: &InsurancePlan, policy_type: u8) -> Result<PolicyRequest, PurchaseError> {
    let premium_wei = plan.premium_wei().ok_or_else(|| {
        PurchaseError::TransactionRejected(format!("plan {} premium '{}' is not an ether amount", plan.id, plan.premium))
    })?;
    let coverage = plan.coverage_units().ok_or_else(|| {
        PurchaseError::TransactionRejected(format!(
            "plan {} coverage '{}' is not a whole number",
            plan.id, plan.coverage_amount
        ))
    })?;

    Ok(PolicyRequest {
        coverage,
        policy_type,
        duration_days: plan.duration_days,
        premium_wei,
    })
}

impl std::fmt::Debug for PolicyPurchaseFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyPurchaseFlow")
            .field("contract", &self.contract.as_ref().map(|c| c.address()))
            .field("in_flight", &self.in_flight.len())
            .field("policy_type", &self.policy_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_plans, StaticPlanSource};
    use alloy::primitives::{utils::parse_ether, Address, U256};

    async fn flow_without_contract() -> PolicyPurchaseFlow {
        let catalog = PlanCatalog::load(Arc::new(StaticPlanSource::default()), None)
            .await
            .unwrap();
        PolicyPurchaseFlow::new(Arc::new(catalog), None, &InsuranceConfig::default())
    }

    #[test]
    fn test_policy_request_for_premium_plan() {
        let plan = default_plans().into_iter().find(|p| p.id == PlanId(2)).unwrap();
        let request = policy_request(&plan, 1).unwrap();

        assert_eq!(request.coverage, U256::from(3));
        assert_eq!(request.premium_wei, parse_ether("200").unwrap());
        assert_eq!(request.duration_days, 30);
        assert_eq!(request.policy_type, 1);
    }

    #[test]
    fn test_policy_request_rejects_bad_amounts() {
        let mut plan = default_plans().remove(0);
        plan.premium = "fifty".to_string();
        assert!(matches!(
            policy_request(&plan, 1),
            Err(PurchaseError::TransactionRejected(_))
        ));
    }

    #[tokio::test]
    async fn test_not_connected_for_any_plan() {
        let flow = flow_without_contract().await;
        let session = Session::new();
        for id in [0, 1, 2, 3, 42] {
            let err = flow.purchase(&session, PlanId(id)).await.unwrap_err();
            assert!(matches!(err, PurchaseError::NotConnected));
        }
    }

    #[tokio::test]
    async fn test_missing_contract_is_misconfiguration() {
        let flow = flow_without_contract().await;
        let session = Session::connected(Account(Address::repeat_byte(0x42)));
        let err = flow.purchase(&session, PlanId(1)).await.unwrap_err();
        assert!(matches!(err, PurchaseError::MisconfiguredContract));
        assert!(flow.in_flight().is_empty());
    }
}
