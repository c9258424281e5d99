//! Claim submission and listing.
//!
//! # Responsibilities
//! - Validate claim forms against the plan catalog
//! - Optionally send `submitClaim` to the contract and wait for confirmation
//! - Keep each account's claims in the [`ClaimBook`]

pub mod book;
pub mod types;

use alloy::primitives::U256;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::{ClaimRequest, ConfirmationStatus, ContractClient};
use crate::catalog::PlanCatalog;
use crate::config::InsuranceConfig;
use crate::observability::metrics;
use crate::session::{Account, Session};

pub use book::ClaimBook;
pub use types::{Claim, ClaimForm, ClaimStatus, SubmitError, ValidatedClaim};

/// Files claims for the session's account.
pub struct ClaimSubmissionFlow {
    catalog: Arc<PlanCatalog>,
    contract: Option<Arc<dyn ContractClient>>,
    book: ClaimBook,
    submit_on_chain: bool,
    seed_samples: bool,
    confirmation_timeout_secs: u64,
}

impl ClaimSubmissionFlow {
    pub fn new(
        catalog: Arc<PlanCatalog>,
        contract: Option<Arc<dyn ContractClient>>,
        config: &InsuranceConfig,
    ) -> Self {
        Self {
            catalog,
            contract,
            book: ClaimBook::new(),
            submit_on_chain: config.claims.submit_on_chain,
            seed_samples: config.claims.seed_samples,
            confirmation_timeout_secs: config.blockchain.confirmation_timeout_secs,
        }
    }

    /// Hook run when an account connects; seeds demo claims if enabled.
    pub fn on_connect(&self, account: Account) {
        if self.seed_samples && self.contract.is_some() {
            self.book.seed_samples(account);
        }
    }

    /// Validate and record a claim.
    pub async fn submit(&self, session: &Session, form: &ClaimForm) -> Result<Claim, SubmitError> {
        let operation_id = Uuid::new_v4();
        let span = tracing::info_span!("claim", %operation_id);

        let result = self.run(session, form).instrument(span).await;
        match &result {
            Ok(_) => metrics::record_claim("submitted"),
            Err(e) => metrics::record_claim(e.outcome()),
        }
        result
    }

    async fn run(&self, session: &Session, form: &ClaimForm) -> Result<Claim, SubmitError> {
        let account = session.account().ok_or(SubmitError::NotConnected)?;
        let claim = form.validate(&self.catalog)?;
        let contract = self.contract.as_ref().ok_or(SubmitError::MisconfiguredContract)?;

        if self.submit_on_chain {
            self.send_on_chain(contract.as_ref(), &account, &claim).await?;
        }

        let claim = self.book.append(account, claim);
        tracing::info!(
            account = %account,
            claim_id = claim.id,
            policy_id = %claim.policy_id,
            amount = %claim.amount,
            "Claim recorded"
        );
        Ok(claim)
    }

    async fn send_on_chain(
        &self,
        contract: &dyn ContractClient,
        account: &Account,
        claim: &ValidatedClaim,
    ) -> Result<(), SubmitError> {
        let request = ClaimRequest {
            policy_id: U256::from(claim.policy_id.0),
            amount: claim.amount_wei,
            reason: claim.reason.clone(),
            evidence: claim.evidence.clone(),
        };

        let tx_hash = contract.submit_claim(account.address(), &request).await?;
        let status = contract
            .wait_for_confirmation(tx_hash)
            .await
            .map_err(|e| SubmitError::after_broadcast(tx_hash, e))?;
        match status {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::info!(tx_hash = %tx_hash, block_number, "Claim transaction confirmed");
                Ok(())
            }
            ConfirmationStatus::Failed(reason) => Err(SubmitError::TransactionReverted(reason)),
            ConfirmationStatus::Pending | ConfirmationStatus::Confirming { .. } => {
                Err(SubmitError::TimedOut(self.confirmation_timeout_secs))
            }
        }
    }

    /// Claims of the connected account, newest first.
    ///
    /// Empty when disconnected or when no contract is configured.
    pub fn list_claims(&self, session: &Session) -> Vec<Claim> {
        match (session.account(), self.contract.as_ref()) {
            (Some(account), Some(_)) => self.book.list(&account),
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Debug for ClaimSubmissionFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimSubmissionFlow")
            .field("contract", &self.contract.as_ref().map(|c| c.address()))
            .field("submit_on_chain", &self.submit_on_chain)
            .field("seed_samples", &self.seed_samples)
            .finish()
    }
}
