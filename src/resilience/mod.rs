//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Wallet request / confirmation wait:
//!     → timeouts.rs (every wait on a user or the chain has a deadline)
//!     → backoff.rs (receipt polling spaced with jittered exponential delays)
//! ```
//!
//! # Design Decisions
//! - Nothing is retried automatically; errors report `is_retryable()` instead
//! - Timeout errors are distinct from other errors

pub mod backoff;
pub mod timeouts;

pub use backoff::calculate_backoff;
pub use timeouts::{with_deadline, DeadlineExceeded};
