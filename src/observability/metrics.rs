//! Metrics collection and exposition.
//!
//! # Metrics
//! - `storefront_admin_auth_total` (counter): gate decisions by variant and outcome
//! - `storefront_store_errors_total` (counter): failed document reads/writes by store
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus exporter runs its own listener, off the public port

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// `variant` is `admin`, `write` or `strict`; `outcome` is an admission or rejection kind.
pub fn record_admin_auth(variant: &'static str, outcome: &'static str) {
    counter!("storefront_admin_auth_total", "variant" => variant, "outcome" => outcome).increment(1);
}

pub fn record_store_error(store: &'static str) {
    counter!("storefront_store_errors_total", "store" => store).increment(1);
}
