//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse, deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → InsuranceConfig (validated, immutable)
//!     → handed to InsuranceApp at startup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - The contract address is the only setting read from the environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BlockchainConfig, ClaimsConfig, ContractConfig, InsuranceConfig, ObservabilityConfig,
    WalletConfig,
};
