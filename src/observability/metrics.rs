//! Metrics collection and exposition.
//!
//! # Metrics
//! - `insurance_wallet_connect_total` (counter): connection attempts by outcome
//! - `insurance_purchases_total` (counter): policy purchases by outcome
//! - `insurance_claims_total` (counter): claim submissions by outcome
//! - `insurance_rpc_health` (gauge): 1=reachable, 0=unreachable

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_wallet_connect(outcome: &'static str) {
    counter!("insurance_wallet_connect_total", "outcome" => outcome).increment(1);
}

pub fn record_purchase(outcome: &'static str) {
    counter!("insurance_purchases_total", "outcome" => outcome).increment(1);
}

pub fn record_claim(outcome: &'static str) {
    counter!("insurance_claims_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    gauge!("insurance_rpc_health").set(if healthy { 1.0 } else { 0.0 });
}
