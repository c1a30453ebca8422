//! Metrics collection and exposition.
//!
//! # Metrics
//! - `app_requests_total` (counter): requests by method, route, status
//! - `app_request_duration_seconds` (histogram): latency by method, route
//! - `app_visits_recorded_total` (counter): visits written to the store
//! - `app_visit_failures_total` (counter): visits lost to store errors
//! - `app_users_created_total` (counter): successful registrations
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus
//! recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("app_requests_total", "Total HTTP requests handled");
    describe_histogram!(
        "app_request_duration_seconds",
        Unit::Seconds,
        "HTTP request latency"
    );
    describe_counter!("app_visits_recorded_total", "Visits written to the store");
    describe_counter!(
        "app_visit_failures_total",
        "Visits that could not be written to the store"
    );
    describe_counter!("app_users_created_total", "Users registered");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "app_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "app_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn visit_recorded() {
    counter!("app_visits_recorded_total").increment(1);
}

pub fn visit_failed() {
    counter!("app_visit_failures_total").increment(1);
}

pub fn user_created() {
    counter!("app_users_created_total").increment(1);
}
