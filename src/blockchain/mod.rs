//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key) + config (RPC URL, contract address)
//!     → wallet.rs (account access, signing, broadcast)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → transaction.rs (build, confirm)
//!     → contract.rs (insurance contract entry points)
//!     → events.rs (scoped PolicyCreated subscriptions)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod abi;
pub mod client;
pub mod contract;
pub mod events;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use contract::{ContractClient, InsuranceContract};
pub use events::PolicySubscription;
pub use types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ClaimRequest,
    ConfirmationStatus, PolicyCreatedEvent, PolicyRequest,
};
pub use wallet::{LocalWallet, WalletProvider};
