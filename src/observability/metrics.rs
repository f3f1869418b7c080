//! Metrics collection and exposition.
//!
//! # Metrics
//! - `portal_requests_total` (counter): dispatched requests by method, status
//! - `portal_request_duration_seconds` (histogram): latency distribution
//! - `portal_routes` (gauge): routes in the table, labelled `all` / `active`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("portal_requests_total", &labels).increment(1);
    histogram!("portal_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record the size of the route table after a load or mutation.
pub fn record_route_counts(total: usize, active: usize) {
    gauge!("portal_routes", "state" => "all").set(total as f64);
    gauge!("portal_routes", "state" => "active").set(active as f64);
}
