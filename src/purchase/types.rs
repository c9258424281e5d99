//! Purchase outcome and error types.

use alloy::primitives::TxHash;
use serde::Serialize;
use thiserror::Error;

use crate::blockchain::{BlockchainError, PolicyCreatedEvent};
use crate::catalog::PlanId;

/// Why a policy purchase did not go through.
#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Insurance contract is not configured")]
    MisconfiguredContract,

    #[error("Plan {0} does not exist")]
    InvalidPlan(PlanId),

    /// A purchase of this plan by the same account is still running.
    #[error("A purchase of plan {0} is already in progress")]
    InFlight(PlanId),

    /// The wallet or RPC node refused the submission.
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("Transaction not confirmed within {0} seconds")]
    TimedOut(u64),

    /// The transaction was broadcast but its outcome could not be read.
    #[error("Transaction {tx_hash} was sent but its status is unknown: {reason}")]
    ConfirmationUnknown { tx_hash: TxHash, reason: String },
}

impl PurchaseError {
    /// Whether the user can reasonably try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PurchaseError::InFlight(_) | PurchaseError::TransactionRejected(_) | PurchaseError::TimedOut(_)
        )
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            PurchaseError::NotConnected => "not_connected",
            PurchaseError::MisconfiguredContract => "misconfigured",
            PurchaseError::InvalidPlan(_) => "invalid_plan",
            PurchaseError::InFlight(_) => "in_flight",
            PurchaseError::TransactionRejected(_) => "rejected",
            PurchaseError::TransactionReverted(_) => "reverted",
            PurchaseError::TimedOut(_) => "timed_out",
            PurchaseError::ConfirmationUnknown { .. } => "unknown",
        }
    }

    /// Map a failure seen while waiting on an already broadcast transaction.
    ///
    /// Only a revert or a timeout is conclusive; anything else leaves the
    /// transaction possibly mined, so it must not read as a rejection.
    pub fn after_broadcast(tx_hash: TxHash, err: BlockchainError) -> Self {
        match err {
            BlockchainError::Reverted(_) | BlockchainError::Timeout(_) | BlockchainError::ConfirmationTimeout(_) => {
                err.into()
            }
            other => PurchaseError::ConfirmationUnknown {
                tx_hash,
                reason: other.to_string(),
            },
        }
    }
}

impl From<BlockchainError> for PurchaseError {
    fn from(err: BlockchainError) -> Self {
        match err {
            BlockchainError::Reverted(reason) => PurchaseError::TransactionReverted(reason),
            BlockchainError::Timeout(secs) | BlockchainError::ConfirmationTimeout(secs) => {
                PurchaseError::TimedOut(secs)
            }
            other => PurchaseError::TransactionRejected(other.to_string()),
        }
    }
}

/// A confirmed policy purchase.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub plan_id: PlanId,
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// The `PolicyCreated` event, if it arrived within the wait window.
    pub event: Option<PolicyCreatedEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blockchain_error_mapping() {
        assert!(matches!(
            PurchaseError::from(BlockchainError::Reverted("out of gas".into())),
            PurchaseError::TransactionReverted(r) if r == "out of gas"
        ));
        assert!(matches!(
            PurchaseError::from(BlockchainError::ConfirmationTimeout(120)),
            PurchaseError::TimedOut(120)
        ));
        assert!(matches!(
            PurchaseError::from(BlockchainError::GasPriceTooHigh { current_gwei: 900, max_gwei: 500 }),
            PurchaseError::TransactionRejected(_)
        ));
    }

    #[test]
    fn test_rpc_failure_after_broadcast_is_not_retryable() {
        let tx_hash = TxHash::repeat_byte(0x11);
        let err = PurchaseError::after_broadcast(tx_hash, BlockchainError::Rpc("connection reset".into()));

        assert!(matches!(
            &err,
            PurchaseError::ConfirmationUnknown { tx_hash: h, reason } if *h == tx_hash && reason.contains("connection reset")
        ));
        assert!(!err.is_retryable());
        assert_eq!(err.outcome(), "unknown");

        assert!(matches!(
            PurchaseError::after_broadcast(tx_hash, BlockchainError::ConfirmationTimeout(120)),
            PurchaseError::TimedOut(120)
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(!PurchaseError::NotConnected.is_retryable());
        assert!(!PurchaseError::InvalidPlan(PlanId(9)).is_retryable());
        assert!(!PurchaseError::TransactionReverted("x".into()).is_retryable());
        assert!(PurchaseError::TimedOut(5).is_retryable());
        assert_eq!(PurchaseError::InFlight(PlanId(2)).outcome(), "in_flight");
    }
}
