//! Claim records, the submission form and submission errors.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::catalog::{PlanCatalog, PlanId};
use crate::format::parse_decimal;
use crate::session::Account;

/// Review state of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ClaimStatus::Pending => "Pending",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
        };
        f.write_str(label)
    }
}

/// A payout request against a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Assigned locally, one above the account's previous maximum.
    pub id: u64,
    pub policy_id: PlanId,
    pub claimant: Account,
    pub date: DateTime<Utc>,
    /// Claimed amount as entered, in ether.
    pub amount: String,
    pub reason: String,
    pub evidence: String,
    pub status: ClaimStatus,
}

/// Raw claim input, exactly as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimForm {
    pub policy_id: String,
    pub amount: String,
    pub reason: String,
    pub evidence: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedClaim {
    pub policy_id: PlanId,
    pub amount: String,
    pub amount_wei: U256,
    pub reason: String,
    pub evidence: String,
}

impl ClaimForm {
    /// Check every field against the catalog.
    ///
    /// Fields are checked in form order; the first problem is reported.
    pub fn validate(&self, catalog: &PlanCatalog) -> Result<ValidatedClaim, SubmitError> {
        for (field, value) in [
            ("policy_id", &self.policy_id),
            ("amount", &self.amount),
            ("reason", &self.reason),
            ("evidence", &self.evidence),
        ] {
            if value.trim().is_empty() {
                return Err(SubmitError::invalid(field, "is required"));
            }
        }

        let policy_id = self
            .policy_id
            .trim()
            .parse::<u64>()
            .map(PlanId)
            .map_err(|_| SubmitError::invalid("policy_id", "must be a number"))?;
        if !catalog.contains(policy_id) {
            return Err(SubmitError::invalid(
                "policy_id",
                format!("policy {} does not exist", policy_id),
            ));
        }

        let amount = self.amount.trim();
        let positive = parse_decimal(amount).is_some_and(|v| v > 0.0);
        let amount_wei = parse_ether(amount)
            .ok()
            .filter(|wei| positive && !wei.is_zero())
            .ok_or_else(|| SubmitError::invalid("amount", "must be a positive amount"))?;

        Ok(ValidatedClaim {
            policy_id,
            amount: amount.to_string(),
            amount_wei,
            reason: self.reason.trim().to_string(),
            evidence: self.evidence.trim().to_string(),
        })
    }
}

/// Why a claim could not be submitted.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Invalid {field}: {reason}")]
    ValidationFailed { field: &'static str, reason: String },

    #[error("Insurance contract is not configured")]
    MisconfiguredContract,

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("Transaction not confirmed within {0} seconds")]
    TimedOut(u64),

    /// The claim was broadcast but its outcome could not be read.
    #[error("Transaction {tx_hash} was sent but its status is unknown: {reason}")]
    ConfirmationUnknown { tx_hash: TxHash, reason: String },
}

impl SubmitError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SubmitError::ValidationFailed {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::TransactionRejected(_) | SubmitError::TimedOut(_))
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            SubmitError::NotConnected => "not_connected",
            SubmitError::ValidationFailed { .. } => "invalid",
            SubmitError::MisconfiguredContract => "misconfigured",
            SubmitError::TransactionRejected(_) => "rejected",
            SubmitError::TransactionReverted(_) => "reverted",
            SubmitError::TimedOut(_) => "timed_out",
            SubmitError::ConfirmationUnknown { .. } => "unknown",
        }
    }

    /// Map a failure seen while waiting on an already broadcast claim.
    pub fn after_broadcast(tx_hash: TxHash, err: BlockchainError) -> Self {
        match err {
            BlockchainError::Reverted(_) | BlockchainError::Timeout(_) | BlockchainError::ConfirmationTimeout(_) => {
                err.into()
            }
            other => SubmitError::ConfirmationUnknown {
                tx_hash,
                reason: other.to_string(),
            },
        }
    }
}

impl From<BlockchainError> for SubmitError {
    fn from(err: BlockchainError) -> Self {
        match err {
            BlockchainError::Reverted(reason) => SubmitError::TransactionReverted(reason),
            BlockchainError::Timeout(secs) | BlockchainError::ConfirmationTimeout(secs) => {
                SubmitError::TimedOut(secs)
            }
            other => SubmitError::TransactionRejected(other.to_string()),
        }
    }
}
