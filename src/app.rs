//! Application facade.
//!
//! # Responsibilities
//! - Wire wallet, contract, catalog and flows from an [`InsuranceConfig`]
//! - Own the single [`Session`] every flow reads the account from
//! - Refresh the owned policy set whenever the account changes

use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::{
    BlockchainClient, BlockchainError, ContractClient, InsuranceContract, LocalWallet, WalletProvider,
};
use crate::catalog::{CatalogError, InsurancePlan, PlanCatalog, PlanCatalogSource, PlanId, StaticPlanSource};
use crate::claims::{Claim, ClaimForm, ClaimSubmissionFlow, SubmitError};
use crate::config::{ConfigError, InsuranceConfig};
use crate::connector::{ConnectionError, WalletConnector};
use crate::purchase::{PolicyPurchaseFlow, PurchaseError, PurchaseReceipt};
use crate::session::{Account, Session};

/// Any failure surfaced by [`InsuranceApp`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid contract configuration: {0}")]
    Contract(String),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Purchase(#[from] PurchaseError),

    #[error(transparent)]
    Claim(#[from] SubmitError),
}

impl AppError {
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Config(_) | AppError::Contract(_) => false,
            AppError::Blockchain(e) => e.is_retryable(),
            AppError::Catalog(CatalogError::OwnedQuery(e)) => e.is_retryable(),
            AppError::Catalog(CatalogError::SourceUnavailable(_)) => true,
            AppError::Connection(e) => e.is_retryable(),
            AppError::Purchase(e) => e.is_retryable(),
            AppError::Claim(e) => e.is_retryable(),
        }
    }
}

/// The insurance client: one session plus the flows acting on it.
pub struct InsuranceApp {
    session: Session,
    connector: WalletConnector,
    catalog: Arc<PlanCatalog>,
    purchases: PolicyPurchaseFlow,
    claims: ClaimSubmissionFlow,
}

impl InsuranceApp {
    /// Build the application from configuration and the environment.
    ///
    /// A missing wallet key or contract address is not an error; the
    /// corresponding operations report it when used.
    pub async fn from_config(config: &InsuranceConfig) -> Result<Self, AppError> {
        let wallet: Option<Arc<dyn WalletProvider>> = match LocalWallet::from_env(&config.blockchain) {
            Ok(wallet) => Some(Arc::new(wallet)),
            Err(e) => {
                tracing::info!(reason = %e, "No local wallet available");
                None
            }
        };

        let address = config.contract.parsed_address().map_err(AppError::Contract)?;
        let contract: Option<Arc<dyn ContractClient>> = match (address, wallet.clone()) {
            (Some(address), Some(wallet)) => {
                let client = BlockchainClient::new(config.blockchain.clone()).await?;
                if !client.is_healthy().await {
                    tracing::warn!(rpc_url = %config.blockchain.rpc_url, "RPC endpoint is not answering");
                }
                Some(Arc::new(InsuranceContract::new(address, client, wallet, &config.contract)))
            }
            (Some(address), None) => {
                tracing::warn!(contract = %address, "Contract configured but no wallet; contract features disabled");
                None
            }
            (None, _) => {
                tracing::warn!("No contract address configured; browsing plans only");
                None
            }
        };

        let source = Arc::new(StaticPlanSource::new(config.plans.clone()));
        Self::with_parts(config, wallet, contract, source).await
    }

    /// Build the application from explicit collaborators.
    pub async fn with_parts(
        config: &InsuranceConfig,
        wallet: Option<Arc<dyn WalletProvider>>,
        contract: Option<Arc<dyn ContractClient>>,
        source: Arc<dyn PlanCatalogSource>,
    ) -> Result<Self, AppError> {
        let catalog = Arc::new(PlanCatalog::load(source, contract.clone()).await?);

        Ok(Self {
            session: Session::new(),
            connector: WalletConnector::new(wallet, config.wallet.request_timeout_secs),
            purchases: PolicyPurchaseFlow::new(Arc::clone(&catalog), contract.clone(), config),
            claims: ClaimSubmissionFlow::new(Arc::clone(&catalog), contract, config),
            catalog,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Connect the wallet and load what the account owns.
    ///
    /// A failed owned-policy refresh leaves the set empty; the connection
    /// itself still succeeds.
    pub async fn connect(&self) -> Result<Account, AppError> {
        let account = self.connector.connect(&self.session).await?;

        if let Err(e) = self.refresh_owned().await {
            tracing::warn!(account = %account, error = %e, "Owned policy refresh failed");
        }
        self.claims.on_connect(account);

        Ok(account)
    }

    pub fn disconnect(&self) {
        self.connector.disconnect(&self.session);
    }

    /// Re-query the contract for the account's policies.
    pub async fn refresh_owned(&self) -> Result<BTreeSet<PlanId>, AppError> {
        let account = self.session.account();
        let owned = self.catalog.list_owned(account.as_ref()).await?;
        self.session.set_owned(owned.clone());
        Ok(owned)
    }

    pub async fn plans(&self) -> Result<Vec<InsurancePlan>, AppError> {
        Ok(self.catalog.list_plans().await?)
    }

    pub fn owned(&self) -> BTreeSet<PlanId> {
        self.session.owned()
    }

    pub async fn purchase(&self, plan_id: PlanId) -> Result<PurchaseReceipt, AppError> {
        Ok(self.purchases.purchase(&self.session, plan_id).await?)
    }

    pub async fn submit_claim(&self, form: &ClaimForm) -> Result<Claim, AppError> {
        Ok(self.claims.submit(&self.session, form).await?)
    }

    pub fn claims(&self) -> Vec<Claim> {
        self.claims.list_claims(&self.session)
    }
}

impl std::fmt::Debug for InsuranceApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsuranceApp")
            .field("account", &self.session.account())
            .field("connector", &self.connector)
            .field("catalog", &self.catalog)
            .finish()
    }
}
