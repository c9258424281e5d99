//! Insurance contract client.
//!
//! # Data Flow
//! ```text
//! flow → ContractClient::create_policy / submit_claim
//!     → TxBuilder (gas ceiling, call data)
//!     → WalletProvider (sign + broadcast)
//!     → ContractClient::wait_for_confirmation (receipt polling)
//! ```

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::abi::{createPolicyCall, getUserPoliciesCall, submitClaimCall};
use crate::blockchain::client::BlockchainClient;
use crate::blockchain::events::{self, PolicySubscription};
use crate::blockchain::transaction::TxBuilder;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ClaimRequest, ConfirmationStatus, PolicyRequest,
};
use crate::blockchain::wallet::WalletProvider;
use crate::config::ContractConfig;

/// Operations the flows need from the deployed insurance contract.
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Deployed contract address.
    fn address(&self) -> Address;

    /// Submit a `createPolicy` transaction paid by `holder`.
    async fn create_policy(&self, holder: Address, request: &PolicyRequest) -> BlockchainResult<TxHash>;

    /// Submit a `submitClaim` transaction from `holder`.
    async fn submit_claim(&self, holder: Address, request: &ClaimRequest) -> BlockchainResult<TxHash>;

    /// Wait until `tx_hash` is mined and confirmed, or the deadline passes.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus>;

    /// Open a scoped subscription to `PolicyCreated` events for `holder`.
    async fn watch_policy_created(&self, holder: Address) -> BlockchainResult<PolicySubscription>;

    /// Plan IDs currently held by `holder`.
    async fn user_policies(&self, holder: Address) -> BlockchainResult<Vec<U256>>;
}

/// JSON-RPC backed [`ContractClient`].
pub struct InsuranceContract {
    address: Address,
    client: BlockchainClient,
    tx_builder: TxBuilder,
    wallet: Arc<dyn WalletProvider>,
    confirmation_timeout_secs: u64,
    event_poll_interval: Duration,
}

impl InsuranceContract {
    pub fn new(
        address: Address,
        client: BlockchainClient,
        wallet: Arc<dyn WalletProvider>,
        config: &ContractConfig,
    ) -> Self {
        let confirmation_timeout_secs = client.config().confirmation_timeout_secs;
        Self {
            address,
            tx_builder: TxBuilder::new(client.clone()),
            client,
            wallet,
            confirmation_timeout_secs,
            event_poll_interval: Duration::from_millis(config.event_poll_ms),
        }
    }

    async fn send_call(&self, value: U256, data: Vec<u8>) -> BlockchainResult<TxHash> {
        let tx = self.tx_builder.build(self.address, value, data.into()).await?;
        self.wallet.send_transaction(tx).await
    }
}

#[async_trait]
impl ContractClient for InsuranceContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn create_policy(&self, holder: Address, request: &PolicyRequest) -> BlockchainResult<TxHash> {
        let call = createPolicyCall {
            coverageAmount: request.coverage,
            policyType: request.policy_type,
            duration: U256::from(request.duration_days),
        };

        tracing::info!(
            holder = %holder,
            contract = %self.address,
            coverage = %request.coverage,
            premium_wei = %request.premium_wei,
            "Submitting createPolicy"
        );
        self.send_call(request.premium_wei, call.abi_encode()).await
    }

    async fn submit_claim(&self, holder: Address, request: &ClaimRequest) -> BlockchainResult<TxHash> {
        let call = submitClaimCall {
            policyId: request.policy_id,
            amount: request.amount,
            reason: request.reason.clone(),
            evidence: request.evidence.clone(),
        };

        tracing::info!(
            holder = %holder,
            contract = %self.address,
            policy_id = %request.policy_id,
            "Submitting submitClaim"
        );
        self.send_call(U256::ZERO, call.abi_encode()).await
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        self.tx_builder
            .wait_for_confirmation(tx_hash, self.confirmation_timeout_secs)
            .await
    }

    async fn watch_policy_created(&self, holder: Address) -> BlockchainResult<PolicySubscription> {
        let from_block = self.client.get_block_number().await?;
        Ok(events::watch_policy_created(
            self.client.clone(),
            self.address,
            holder,
            from_block,
            self.event_poll_interval,
        ))
    }

    async fn user_policies(&self, holder: Address) -> BlockchainResult<Vec<U256>> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(getUserPoliciesCall { user: holder }.abi_encode());

        let output = self.client.call(tx).await?;
        getUserPoliciesCall::abi_decode_returns(&output)
            .map_err(|e| BlockchainError::Abi(format!("getUserPolicies: {}", e)))
    }
}

impl std::fmt::Debug for InsuranceContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsuranceContract")
            .field("address", &self.address)
            .field("client", &self.client)
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .finish()
    }
}
