//! Per-account claim ledger.

use alloy::primitives::Address;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::catalog::PlanId;
use crate::claims::types::{Claim, ClaimStatus, ValidatedClaim};
use crate::session::Account;

/// Thread-safe store of claims, keyed by claimant address.
#[derive(Debug, Clone, Default)]
pub struct ClaimBook {
    inner: Arc<DashMap<Address, Vec<Claim>>>,
}

impl ClaimBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new `Pending` claim for `account`.
    pub fn append(&self, account: Account, claim: ValidatedClaim) -> Claim {
        let mut ledger = self.inner.entry(account.address()).or_default();
        let id = ledger.iter().map(|c| c.id).max().unwrap_or(0) + 1;

        let claim = Claim {
            id,
            policy_id: claim.policy_id,
            claimant: account,
            date: Utc::now(),
            amount: claim.amount,
            reason: claim.reason,
            evidence: claim.evidence,
            status: ClaimStatus::Pending,
        };
        ledger.push(claim.clone());
        claim
    }

    /// Claims filed by `account`, newest first.
    pub fn list(&self, account: &Account) -> Vec<Claim> {
        let mut claims = self
            .inner
            .get(&account.address())
            .map(|ledger| ledger.clone())
            .unwrap_or_default();
        claims.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        claims
    }

    pub fn len(&self, account: &Account) -> usize {
        self.inner.get(&account.address()).map_or(0, |ledger| ledger.len())
    }

    /// Install the two demo claims for an account with an empty ledger.
    pub fn seed_samples(&self, account: Account) -> bool {
        let mut ledger = self.inner.entry(account.address()).or_default();
        if !ledger.is_empty() {
            return false;
        }

        let now = Utc::now();
        ledger.push(Claim {
            id: 1,
            policy_id: PlanId(2),
            claimant: account,
            date: now - Duration::days(7),
            amount: "15000".to_string(),
            reason: "Smart contract exploit".to_string(),
            evidence: "https://etherscan.io/tx/0x...".to_string(),
            status: ClaimStatus::Pending,
        });
        ledger.push(Claim {
            id: 2,
            policy_id: PlanId(1),
            claimant: account,
            date: now - Duration::days(30),
            amount: "3000".to_string(),
            reason: "Protocol hack".to_string(),
            evidence: "https://etherscan.io/tx/0x...".to_string(),
            status: ClaimStatus::Approved,
        });

        tracing::debug!(account = %account, "Seeded sample claims");
        true
    }
}
