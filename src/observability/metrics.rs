//! Metrics collection and exposition.
//!
//! # Metrics
//! - `schemagate_passes_total` (counter): passes by outcome
//! - `schemagate_pass_duration_seconds` (histogram)
//! - `schemagate_endpoints` (gauge): endpoints currently served
//! - `schemagate_reports_total` (counter): reports by object kind and state
//! - `schemagate_loop_errors_total` (counter): event-loop errors by origin

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::model::ObjectKind;

pub mod names {
    pub const PASSES_TOTAL: &str = "schemagate_passes_total";
    pub const PASS_DURATION_SECONDS: &str = "schemagate_pass_duration_seconds";
    pub const ENDPOINTS: &str = "schemagate_endpoints";
    pub const REPORTS_TOTAL: &str = "schemagate_reports_total";
    pub const LOOP_ERRORS_TOTAL: &str = "schemagate_loop_errors_total";
}

/// Install the Prometheus recorder with its own scrape listener.
///
/// Must be called from within a Tokio runtime. Returns false on failure.
pub fn init_metrics(addr: SocketAddr) -> bool {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Prometheus exporter listening");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus exporter");
            false
        }
    }
}

pub fn record_pass(duration: Duration, succeeded: bool) {
    let outcome = if succeeded { "ok" } else { "error" };
    counter!(names::PASSES_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::PASS_DURATION_SECONDS).record(duration.as_secs_f64());
}

pub fn record_endpoints(count: usize) {
    gauge!(names::ENDPOINTS).set(count as f64);
}

pub fn record_report(kind: ObjectKind, accepted: bool) {
    let state = if accepted { "accepted" } else { "rejected" };
    counter!(names::REPORTS_TOTAL, "kind" => kind.as_str(), "state" => state).increment(1);
}

pub fn record_loop_error(origin: &'static str) {
    counter!(names::LOOP_ERRORS_TOTAL, "origin" => origin).increment(1);
}
