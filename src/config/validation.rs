//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check catalog integrity (unique, non-zero plan IDs; convertible amounts)
//! - Validate value ranges (timeouts > 0, URLs and addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: InsuranceConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use thiserror::Error;

use crate::catalog::types::InsurancePlan;
use crate::config::schema::InsuranceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &InsuranceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.wallet.request_timeout_secs == 0 {
        errors.push(ValidationError::new("wallet.request_timeout_secs", "must be greater than 0"));
    }

    let chain = &config.blockchain;
    if chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new(
            "blockchain.rpc_url",
            format!("'{}' is not a valid URL", chain.rpc_url),
        ));
    }
    for (field, value) in [
        ("blockchain.rpc_timeout_secs", chain.rpc_timeout_secs),
        ("blockchain.confirmation_timeout_secs", chain.confirmation_timeout_secs),
        ("blockchain.poll_base_ms", chain.poll_base_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }
    if chain.poll_max_ms < chain.poll_base_ms {
        errors.push(ValidationError::new(
            "blockchain.poll_max_ms",
            "must not be smaller than poll_base_ms",
        ));
    }
    if !(chain.gas_price_multiplier >= 1.0) {
        errors.push(ValidationError::new(
            "blockchain.gas_price_multiplier",
            "must be at least 1.0",
        ));
    }

    if let Err(message) = config.contract.parsed_address() {
        errors.push(ValidationError::new("contract.address", message));
    }
    for (field, value) in [
        ("contract.event_timeout_secs", config.contract.event_timeout_secs),
        ("contract.event_poll_ms", config.contract.event_poll_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    validate_plans(&config.plans, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_plans(plans: &[InsurancePlan], errors: &mut Vec<ValidationError>) {
    if plans.is_empty() {
        errors.push(ValidationError::new("plans", "catalog must contain at least one plan"));
    }

    let mut seen = HashSet::new();
    for (idx, plan) in plans.iter().enumerate() {
        let field = |name: &str| format!("plans[{}].{}", idx, name);

        if plan.id.0 == 0 {
            errors.push(ValidationError::new(field("id"), "plan IDs start at 1"));
        }
        if !seen.insert(plan.id) {
            errors.push(ValidationError::new(field("id"), format!("duplicate plan ID {}", plan.id)));
        }
        if plan.name.trim().is_empty() {
            errors.push(ValidationError::new(field("name"), "must not be empty"));
        }
        if plan.duration_days == 0 {
            errors.push(ValidationError::new(field("duration_days"), "must be greater than 0"));
        }
        if plan.premium_wei().is_none() {
            errors.push(ValidationError::new(
                field("premium"),
                format!("'{}' is not an ether amount", plan.premium),
            ));
        }
        if plan.coverage_units().is_none() {
            errors.push(ValidationError::new(
                field("coverage_amount"),
                format!("'{}' is not a whole number", plan.coverage_amount),
            ));
        }
    }
}
