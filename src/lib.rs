//! DeFi insurance client library.
//!
//! Browse insurance plans, connect a wallet, buy policies through the
//! insurance contract and file claims against them.

// Core flows
pub mod app;
pub mod catalog;
pub mod claims;
pub mod connector;
pub mod purchase;
pub mod session;

// Chain integration
pub mod blockchain;

// Cross-cutting concerns
pub mod config;
pub mod format;
pub mod observability;
pub mod resilience;

pub use app::{AppError, InsuranceApp};
pub use config::InsuranceConfig;
pub use session::{Account, Session};
