//! Session context shared by the flows.
//!
//! The application owns one [`Session`] and hands a reference to every flow;
//! nothing reads the connected account from global state.

use alloy::primitives::Address;
use arc_swap::{ArcSwap, ArcSwapOption};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::catalog::types::PlanId;
use crate::format::truncate_address;

/// A connected wallet account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(pub Address);

impl Account {
    pub fn address(&self) -> Address {
        self.0
    }

    /// `0xf39F...2266` style short form.
    pub fn short(&self) -> String {
        truncate_address(&self.0.to_string())
    }
}

impl From<Address> for Account {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connected account and the plans it owns.
#[derive(Debug, Default)]
pub struct Session {
    account: ArcSwapOption<Account>,
    owned: ArcSwap<BTreeSet<PlanId>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session already connected to `account`.
    pub fn connected(account: Account) -> Self {
        let session = Self::new();
        session.set_account(account);
        session
    }

    /// The connected account, if any.
    pub fn account(&self) -> Option<Account> {
        self.account.load_full().map(|a| *a)
    }

    pub fn is_connected(&self) -> bool {
        self.account.load().is_some()
    }

    /// Switch to `account`; the owned set is cleared until refreshed.
    pub fn set_account(&self, account: Account) {
        let previous = self.account.swap(Some(Arc::new(account)));
        if previous.as_deref() != Some(&account) {
            self.owned.store(Arc::new(BTreeSet::new()));
        }
    }

    /// Drop the account and everything derived from it.
    pub fn disconnect(&self) {
        self.account.store(None);
        self.owned.store(Arc::new(BTreeSet::new()));
    }

    /// Plans owned by the connected account.
    pub fn owned(&self) -> BTreeSet<PlanId> {
        self.owned.load().as_ref().clone()
    }

    pub fn owns(&self, plan_id: PlanId) -> bool {
        self.owned.load().contains(&plan_id)
    }

    pub fn set_owned(&self, owned: BTreeSet<PlanId>) {
        self.owned.store(Arc::new(owned));
    }
}
