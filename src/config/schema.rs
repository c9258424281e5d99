//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::catalog::types::{default_plans, InsurancePlan};

/// Environment variable that overrides `contract.address`.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "INSURANCE_CONTRACT_ADDRESS";

/// Root configuration for the insurance client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InsuranceConfig {
    /// Wallet connection settings.
    pub wallet: WalletConfig,

    /// JSON-RPC and transaction settings.
    pub blockchain: BlockchainConfig,

    /// Deployed insurance contract.
    pub contract: ContractConfig,

    /// Claim submission behaviour.
    pub claims: ClaimsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Plan catalog offered to users.
    pub plans: Vec<InsurancePlan>,
}

impl Default for InsuranceConfig {
    fn default() -> Self {
        Self {
            wallet: WalletConfig::default(),
            blockchain: BlockchainConfig::default(),
            contract: ContractConfig::default(),
            claims: ClaimsConfig::default(),
            observability: ObservabilityConfig::default(),
            plans: default_plans(),
        }
    }
}

/// Wallet connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Upper bound on a single account access request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
        }
    }
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for finality.
    pub confirmation_blocks: u32,

    /// Upper bound on waiting for a transaction to confirm, in seconds.
    pub confirmation_timeout_secs: u64,

    /// First receipt poll delay in milliseconds.
    pub poll_base_ms: u64,

    /// Ceiling for the receipt poll delay in milliseconds.
    pub poll_max_ms: u64,

    /// Gas price multiplier (1.0 = estimated, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 120,
            poll_base_ms: 500,
            poll_max_ms: 4000,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
        }
    }
}

/// Deployed insurance contract settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contract address; empty disables every contract-backed operation.
    pub address: String,

    /// `policyType` argument passed to `createPolicy`.
    pub policy_type: u8,

    /// How long a purchase waits for its `PolicyCreated` event, in seconds.
    pub event_timeout_secs: u64,

    /// Log polling interval for event subscriptions in milliseconds.
    pub event_poll_ms: u64,
}

impl ContractConfig {
    /// Parsed contract address, `None` when unset.
    pub fn parsed_address(&self) -> Result<Option<Address>, String> {
        let trimmed = self.address.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<Address>()
            .map(Some)
            .map_err(|e| format!("invalid contract address '{}': {}", trimmed, e))
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            policy_type: 1,
            event_timeout_secs: 15,
            event_poll_ms: 1000,
        }
    }
}

/// Claim submission behaviour.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ClaimsConfig {
    /// Send `submitClaim` to the contract before recording the claim.
    pub submit_on_chain: bool,

    /// Seed the demo claims for each connecting account.
    pub seed_samples: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
