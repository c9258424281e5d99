//! Wallet provider boundary and the local key-backed implementation.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "INSURANCE_WALLET_PRIVATE_KEY";

/// A wallet able to grant account access and sign transactions.
///
/// This is the seam between the flows and whatever holds the user's keys.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access (`eth_requestAccounts`).
    ///
    /// The first address returned is the active account.
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>>;

    /// Sign and broadcast a transaction from the active account.
    async fn send_transaction(&self, tx: TransactionRequest) -> BlockchainResult<TxHash>;
}

/// Wallet backed by a local private key and a signing RPC provider.
pub struct LocalWallet {
    signer: PrivateKeySigner,
    /// Provider with the signer installed as its wallet filler.
    provider: Arc<dyn Provider + Send + Sync>,
    chain_id: u64,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `config` - RPC endpoint and chain the wallet signs for
    pub fn from_private_key(private_key_hex: &str, config: &BlockchainConfig) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;
        let signer = signer.with_chain_id(Some(config.chain_id));

        let rpc_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(rpc_url);

        tracing::info!(
            address = %signer.address(),
            chain_id = config.chain_id,
            "Wallet initialized"
        );

        Ok(Self {
            signer,
            provider: Arc::new(provider),
            chain_id: config.chain_id,
        })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `INSURANCE_WALLET_PRIVATE_KEY` from environment.
    pub fn from_env(config: &BlockchainConfig) -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key, config)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>> {
        // A local key needs no user approval.
        Ok(vec![self.signer.address()])
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let tx = tx.with_from(self.signer.address());
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| BlockchainError::Rejected(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, from = %self.signer.address(), "Transaction broadcast");
        Ok(tx_hash)
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.signer.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
