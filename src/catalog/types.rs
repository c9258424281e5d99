//! Plan catalog types.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Plan identifier, unique within a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub u64);

impl From<u64> for PlanId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<PlanId> for u64 {
    fn from(id: PlanId) -> Self {
        id.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An insurance product offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePlan {
    pub id: PlanId,
    pub name: String,
    pub description: String,
    /// Maximum payout, in whole token units.
    pub coverage_amount: String,
    /// Price of the policy, in ether.
    pub premium: String,
    pub duration_days: u32,
    #[serde(default)]
    pub icon: String,
}

impl InsurancePlan {
    /// Premium converted to wei, `None` if the premium is malformed.
    pub fn premium_wei(&self) -> Option<U256> {
        parse_ether(self.premium.trim()).ok()
    }

    /// Coverage as an integer amount, `None` if malformed.
    pub fn coverage_units(&self) -> Option<U256> {
        U256::from_str_radix(self.coverage_amount.trim(), 10).ok()
    }
}

/// Errors from catalog reads.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The plan source could not produce a catalog.
    #[error("Plan source unavailable: {0}")]
    SourceUnavailable(String),

    /// Reading owned policies from the contract failed.
    #[error("Failed to query owned policies: {0}")]
    OwnedQuery(#[from] crate::blockchain::BlockchainError),
}

/// Catalog offered when the configuration lists no plans.
pub fn default_plans() -> Vec<InsurancePlan> {
    vec![
        InsurancePlan {
            id: PlanId(1),
            name: "Basic Coverage".to_string(),
            description: "Protection against smart contract failures for your DeFi investments"
                .to_string(),
            coverage_amount: "400".to_string(),
            premium: "50".to_string(),
            duration_days: 30,
            icon: "🛡️".to_string(),
        },
        InsurancePlan {
            id: PlanId(2),
            name: "Premium Coverage".to_string(),
            description: "Extended protection including hacks and market volatility".to_string(),
            coverage_amount: "3".to_string(),
            premium: "200".to_string(),
            duration_days: 30,
            icon: "⚔️".to_string(),
        },
        InsurancePlan {
            id: PlanId(3),
            name: "Ultimate Protection".to_string(),
            description: "Comprehensive coverage for all your crypto assets".to_string(),
            coverage_amount: "100000".to_string(),
            premium: "500".to_string(),
            duration_days: 30,
            icon: "🔰".to_string(),
        },
    ]
}
