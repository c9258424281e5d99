//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within the confirmation window.
    #[error("Transaction not confirmed after {0} seconds")]
    ConfirmationTimeout(u64),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// The wallet refused to sign or submit the transaction.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Call data or return data could not be encoded/decoded.
    #[error("ABI error: {0}")]
    Abi(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl BlockchainError {
    /// Whether repeating the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BlockchainError::Rpc(_)
                | BlockchainError::Timeout(_)
                | BlockchainError::ConfirmationTimeout(_)
                | BlockchainError::Rejected(_)
                | BlockchainError::GasPriceTooHigh { .. }
        )
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is pending in mempool.
    Pending,
    /// Transaction has been mined but not enough confirmations.
    Confirming { current: u32, required: u32 },
    /// Transaction is confirmed with required block depth.
    Confirmed { block_number: u64 },
    /// Transaction failed or was dropped.
    Failed(String),
}

/// Arguments of the contract's `createPolicy` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRequest {
    pub coverage: U256,
    pub policy_type: u8,
    pub duration_days: u32,
    /// Premium attached as the transaction value, in wei.
    pub premium_wei: U256,
}

/// Arguments of the contract's `submitClaim` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub policy_id: U256,
    pub amount: U256,
    pub reason: String,
    pub evidence: String,
}

/// A decoded `PolicyCreated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCreatedEvent {
    pub policy_id: U256,
    pub holder: Address,
    pub premium: U256,
    pub coverage: U256,
    pub policy_type: u8,
    /// Transaction that emitted the event, when known.
    pub tx_hash: Option<TxHash>,
    /// Block the event was included in, when known.
    pub block_number: Option<u64>,
}
