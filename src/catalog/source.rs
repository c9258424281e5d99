//! Plan catalog sources.

use async_trait::async_trait;

use crate::catalog::types::{CatalogError, InsurancePlan};

/// Where the plan list comes from.
///
/// The built-in source serves a fixed list; a remote catalog service or
/// contract reader can replace it without touching the flows.
#[async_trait]
pub trait PlanCatalogSource: Send + Sync {
    /// Fetch the current plan offerings.
    async fn fetch_plans(&self) -> Result<Vec<InsurancePlan>, CatalogError>;
}

/// A fixed, in-memory list of plans.
#[derive(Debug, Clone)]
pub struct StaticPlanSource {
    plans: Vec<InsurancePlan>,
}

impl StaticPlanSource {
    pub fn new(plans: Vec<InsurancePlan>) -> Self {
        Self { plans }
    }
}

impl Default for StaticPlanSource {
    fn default() -> Self {
        Self::new(crate::catalog::types::default_plans())
    }
}

#[async_trait]
impl PlanCatalogSource for StaticPlanSource {
    async fn fetch_plans(&self) -> Result<Vec<InsurancePlan>, CatalogError> {
        Ok(self.plans.clone())
    }
}
