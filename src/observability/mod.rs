//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Flows and blockchain client produce:
//!     → logging.rs (structured tracing events, per-operation spans)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr log output
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
