//! Shared mocks and builders for integration tests.

#![allow(dead_code)]

use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use defi_insurance::blockchain::{
    BlockchainError, BlockchainResult, ClaimRequest, ConfirmationStatus, ContractClient,
    PolicyCreatedEvent, PolicyRequest, PolicySubscription, WalletProvider,
};
use defi_insurance::catalog::StaticPlanSource;
use defi_insurance::{InsuranceApp, InsuranceConfig};

/// First Anvil development account.
pub const ALICE: Address = Address::new([
    0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82, 0x72, 0x79, 0xcf,
    0xff, 0xb9, 0x22, 0x66,
]);

pub const BOB: Address = Address::repeat_byte(0xbb);

pub const CONTRACT: Address = Address::repeat_byte(0xc0);

/// Wallet double with scripted account access.
pub struct MockWallet {
    accounts: Mutex<Vec<Address>>,
    delay: Option<Duration>,
    reject: Mutex<Option<String>>,
    sent: AtomicU64,
}

impl MockWallet {
    pub fn with_account(account: Address) -> Self {
        Self {
            accounts: Mutex::new(vec![account]),
            delay: None,
            reject: Mutex::new(None),
            sent: AtomicU64::new(0),
        }
    }

    /// Never answers within any sensible deadline.
    pub fn stalled() -> Self {
        Self {
            delay: Some(Duration::from_secs(30)),
            ..Self::with_account(ALICE)
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject: Mutex::new(Some(reason.to_string())),
            ..Self::with_account(ALICE)
        }
    }

    pub fn empty() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            ..Self::with_account(ALICE)
        }
    }

    /// Simulate the user switching accounts in the wallet.
    pub fn switch_to(&self, account: Address) {
        *self.accounts.lock().unwrap() = vec![account];
    }

    /// Start or stop refusing account requests.
    pub fn set_rejecting(&self, reason: Option<&str>) {
        *self.reject.lock().unwrap() = reason.map(str::to_string);
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = self.reject.lock().unwrap().clone() {
            return Err(BlockchainError::Rejected(reason));
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn send_transaction(&self, _tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TxHash::with_last_byte(n as u8))
    }
}

/// How the mock contract settles a transaction.
#[derive(Debug, Clone)]
pub enum Settlement {
    Confirmed(u64),
    Reverted(String),
    TimedOut,
    /// The receipt poll itself fails after the transaction went out.
    RpcFailure(String),
}

/// Contract double recording every call it receives.
pub struct MockContract {
    owned: Vec<U256>,
    settlement: Settlement,
    settle_delay: Duration,
    reject_submission: Option<String>,
    emit_events: bool,
    foreign_event: bool,
    next_tx: AtomicU64,
    pending_events: Mutex<HashMap<TxHash, PolicyCreatedEvent>>,
    pub policy_requests: Mutex<Vec<(Address, PolicyRequest)>>,
    pub claim_requests: Mutex<Vec<(Address, ClaimRequest)>>,
    subscribers: Mutex<Vec<mpsc::Sender<PolicyCreatedEvent>>>,
}

impl MockContract {
    pub fn new() -> Self {
        Self {
            owned: Vec::new(),
            settlement: Settlement::Confirmed(100),
            settle_delay: Duration::ZERO,
            reject_submission: None,
            emit_events: true,
            foreign_event: false,
            next_tx: AtomicU64::new(0),
            pending_events: Mutex::new(HashMap::new()),
            policy_requests: Mutex::new(Vec::new()),
            claim_requests: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_owned(mut self, ids: &[u64]) -> Self {
        self.owned = ids.iter().map(|id| U256::from(*id)).collect();
        self
    }

    pub fn with_settlement(mut self, settlement: Settlement) -> Self {
        self.settlement = settlement;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject_submission = Some(reason.to_string());
        self
    }

    pub fn silent(mut self) -> Self {
        self.emit_events = false;
        self
    }

    /// Precede every event with one from an unrelated transaction of the same holder.
    pub fn with_foreign_event(mut self) -> Self {
        self.foreign_event = true;
        self
    }

    pub fn subscriptions_opened(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Whether every subscription handed out has been dropped.
    pub fn subscriptions_released(&self) -> bool {
        self.subscribers.lock().unwrap().iter().all(|tx| tx.is_closed())
    }

    fn broadcast(&self, event: PolicyCreatedEvent) {
        for tx in self.subscribers.lock().unwrap().iter() {
            let _ = tx.try_send(event.clone());
        }
    }

    fn next_hash(&self) -> TxHash {
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
        TxHash::with_last_byte(n as u8)
    }
}

#[async_trait]
impl ContractClient for MockContract {
    fn address(&self) -> Address {
        CONTRACT
    }

    async fn create_policy(&self, holder: Address, request: &PolicyRequest) -> BlockchainResult<TxHash> {
        if let Some(reason) = &self.reject_submission {
            return Err(BlockchainError::Rejected(reason.clone()));
        }

        let tx_hash = self.next_hash();
        let mut requests = self.policy_requests.lock().unwrap();
        requests.push((holder, request.clone()));

        if self.emit_events {
            let event = PolicyCreatedEvent {
                policy_id: U256::from(requests.len()),
                holder,
                premium: request.premium_wei,
                coverage: request.coverage,
                policy_type: request.policy_type,
                tx_hash: Some(tx_hash),
                block_number: None,
            };
            self.pending_events.lock().unwrap().insert(tx_hash, event);
        }
        Ok(tx_hash)
    }

    async fn submit_claim(&self, holder: Address, request: &ClaimRequest) -> BlockchainResult<TxHash> {
        if let Some(reason) = &self.reject_submission {
            return Err(BlockchainError::Rejected(reason.clone()));
        }
        self.claim_requests.lock().unwrap().push((holder, request.clone()));
        Ok(self.next_hash())
    }

    /// Events are emitted once the transaction is mined, like the chain does.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        match &self.settlement {
            Settlement::Confirmed(block_number) => {
                let pending = self.pending_events.lock().unwrap().remove(&tx_hash);
                if let Some(event) = pending {
                    if self.foreign_event {
                        self.broadcast(PolicyCreatedEvent {
                            policy_id: U256::from(999),
                            tx_hash: Some(TxHash::repeat_byte(0xee)),
                            ..event.clone()
                        });
                    }
                    self.broadcast(PolicyCreatedEvent {
                        block_number: Some(*block_number),
                        ..event
                    });
                }
                Ok(ConfirmationStatus::Confirmed {
                    block_number: *block_number,
                })
            }
            Settlement::Reverted(reason) => Ok(ConfirmationStatus::Failed(reason.clone())),
            Settlement::TimedOut => Err(BlockchainError::ConfirmationTimeout(1)),
            Settlement::RpcFailure(reason) => Err(BlockchainError::Rpc(reason.clone())),
        }
    }

    async fn watch_policy_created(&self, _holder: Address) -> BlockchainResult<PolicySubscription> {
        let (tx, subscription) = PolicySubscription::channel();
        self.subscribers.lock().unwrap().push(tx);
        Ok(subscription)
    }

    async fn user_policies(&self, _holder: Address) -> BlockchainResult<Vec<U256>> {
        Ok(self.owned.clone())
    }
}

/// Config with short waits suitable for tests.
pub fn test_config() -> InsuranceConfig {
    let mut config = InsuranceConfig::default();
    config.wallet.request_timeout_secs = 1;
    config.contract.event_timeout_secs = 1;
    config
}

/// Build an app over the mocks with the default plan catalog.
pub async fn build_app(
    config: &InsuranceConfig,
    wallet: Option<Arc<MockWallet>>,
    contract: Option<Arc<MockContract>>,
) -> InsuranceApp {
    let wallet = wallet.map(|w| w as Arc<dyn WalletProvider>);
    let contract = contract.map(|c| c as Arc<dyn ContractClient>);
    InsuranceApp::with_parts(config, wallet, contract, Arc::new(StaticPlanSource::default()))
        .await
        .unwrap()
}
