//! Per (account, plan) in-flight purchase tracking.

use alloy::primitives::Address;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::PlanId;

type InFlightKey = (Address, PlanId);

/// Purchases currently running, keyed by holder and plan.
#[derive(Debug, Clone, Default)]
pub struct InFlightTable {
    inner: Arc<DashMap<InFlightKey, Instant>>,
}

impl InFlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the (holder, plan) slot, or `None` if it is already taken.
    pub fn try_acquire(&self, holder: Address, plan_id: PlanId) -> Option<InFlightGuard> {
        let key = (holder, plan_id);
        match self.inner.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(InFlightGuard {
                    table: Arc::clone(&self.inner),
                    key,
                })
            }
        }
    }

    pub fn is_in_flight(&self, holder: Address, plan_id: PlanId) -> bool {
        self.inner.contains_key(&(holder, plan_id))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Releases its slot when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    table: Arc<DashMap<InFlightKey, Instant>>,
    key: InFlightKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some((_, started)) = self.table.remove(&self.key) {
            tracing::debug!(
                holder = %self.key.0,
                plan_id = %self.key.1,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Purchase slot released"
            );
        }
    }
}
