//! Insurance plan catalog.
//!
//! # Responsibilities
//! - Hold the plan list produced by a [`PlanCatalogSource`]
//! - Resolve plans by their `id` field
//! - Report which plans an account owns, via the contract when configured

pub mod source;
pub mod types;

use alloy::primitives::U256;
use arc_swap::ArcSwap;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::blockchain::ContractClient;
use crate::session::Account;

pub use source::{PlanCatalogSource, StaticPlanSource};
pub use types::{default_plans, CatalogError, InsurancePlan, PlanId};

/// Plan list snapshot plus owned-policy lookup.
pub struct PlanCatalog {
    source: Arc<dyn PlanCatalogSource>,
    contract: Option<Arc<dyn ContractClient>>,
    plans: ArcSwap<Vec<InsurancePlan>>,
}

impl PlanCatalog {
    /// Build a catalog and take the first snapshot from `source`.
    pub async fn load(
        source: Arc<dyn PlanCatalogSource>,
        contract: Option<Arc<dyn ContractClient>>,
    ) -> Result<Self, CatalogError> {
        let plans = source.fetch_plans().await?;
        tracing::info!(plans = plans.len(), "Plan catalog loaded");

        Ok(Self {
            source,
            contract,
            plans: ArcSwap::from_pointee(plans),
        })
    }

    /// Re-fetch the plan list from the source.
    pub async fn list_plans(&self) -> Result<Vec<InsurancePlan>, CatalogError> {
        let plans = self.source.fetch_plans().await?;
        self.plans.store(Arc::new(plans.clone()));
        Ok(plans)
    }

    /// Current snapshot without touching the source.
    pub fn plans(&self) -> Vec<InsurancePlan> {
        self.plans.load().as_ref().clone()
    }

    /// Look a plan up by its `id` field.
    pub fn find_plan(&self, id: PlanId) -> Option<InsurancePlan> {
        self.plans.load().iter().find(|p| p.id == id).cloned()
    }

    pub fn contains(&self, id: PlanId) -> bool {
        self.plans.load().iter().any(|p| p.id == id)
    }

    /// Plan IDs owned by `account`.
    ///
    /// Empty when there is no account or no contract. IDs the contract
    /// reports that are not in the catalog are dropped.
    pub async fn list_owned(&self, account: Option<&Account>) -> Result<BTreeSet<PlanId>, CatalogError> {
        let (Some(account), Some(contract)) = (account, self.contract.as_ref()) else {
            return Ok(BTreeSet::new());
        };

        let raw = contract.user_policies(account.address()).await?;
        let mut owned = BTreeSet::new();
        for id in raw {
            match plan_id_from_u256(id).filter(|id| self.contains(*id)) {
                Some(id) => {
                    owned.insert(id);
                }
                None => {
                    tracing::warn!(account = %account, policy = %id, "Ignoring policy outside the catalog")
                }
            }
        }

        tracing::debug!(account = %account, owned = owned.len(), "Owned policies refreshed");
        Ok(owned)
    }
}

fn plan_id_from_u256(value: U256) -> Option<PlanId> {
    u64::try_from(value).ok().map(PlanId)
}

impl std::fmt::Debug for PlanCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanCatalog")
            .field("plans", &self.plans.load().len())
            .field("contract", &self.contract.as_ref().map(|c| c.address()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    #[tokio::test]
    async fn test_find_plan_uses_id_field() {
        let mut plans = default_plans();
        plans.reverse();
        let catalog = PlanCatalog::load(Arc::new(StaticPlanSource::new(plans)), None)
            .await
            .unwrap();

        let plan = catalog.find_plan(PlanId(2)).unwrap();
        assert_eq!(plan.name, "Premium Coverage");
        assert_eq!(catalog.find_plan(PlanId(1)).unwrap().name, "Basic Coverage");
        assert!(catalog.find_plan(PlanId(0)).is_none());
        assert!(catalog.find_plan(PlanId(4)).is_none());
    }

    #[tokio::test]
    async fn test_list_owned_without_account_is_empty() {
        let catalog = PlanCatalog::load(Arc::new(StaticPlanSource::default()), None)
            .await
            .unwrap();
        assert!(catalog.list_owned(None).await.unwrap().is_empty());

        // No contract configured: still empty for a real account.
        let account = Account(Address::repeat_byte(0x42));
        assert!(catalog.list_owned(Some(&account)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_plans_refreshes_snapshot() {
        let catalog = PlanCatalog::load(Arc::new(StaticPlanSource::default()), None)
            .await
            .unwrap();
        let plans = catalog.list_plans().await.unwrap();
        assert_eq!(plans.len(), 3);
        assert_eq!(catalog.plans(), plans);
    }

    #[test]
    fn test_plan_id_from_u256() {
        assert_eq!(plan_id_from_u256(U256::from(3)), Some(PlanId(3)));
        assert_eq!(plan_id_from_u256(U256::MAX), None);
    }
}
