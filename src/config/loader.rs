//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{InsuranceConfig, CONTRACT_ADDRESS_ENV_VAR};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<InsuranceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "Configuration file loaded");
    Ok(config)
}

/// Parse TOML, apply environment overrides and validate.
pub fn parse_config(content: &str) -> Result<InsuranceConfig, ConfigError> {
    let mut config: InsuranceConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Validated configuration from defaults and environment only.
pub fn default_config() -> Result<InsuranceConfig, ConfigError> {
    parse_config("")
}

/// Overlay environment settings on a parsed configuration.
pub fn apply_env_overrides<F>(config: &mut InsuranceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(address) = lookup(CONTRACT_ADDRESS_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(env = CONTRACT_ADDRESS_ENV_VAR, "Contract address taken from environment");
        config.contract.address = address;
    }
}
