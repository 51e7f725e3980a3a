//! Metrics collection and exposition.
//!
//! # Metrics
//! - `travel_requests_total` (counter): requests by method, outcome and status.
//!   Non-standard methods share the `other` label
//!   (`handled`, `fallback`, `not_found`, `unknown_handler`, `tree_error`,
//!   `internal`)
//! - `travel_request_duration_seconds` (histogram): time from tokenizing to
//!   the handler's response, by outcome

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Label for a request method. Clients choose the method, so only the
/// standard verbs get their own series.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "PATCH" => "PATCH",
        "DELETE" => "DELETE",
        "OPTIONS" => "OPTIONS",
        "TRACE" => "TRACE",
        "CONNECT" => "CONNECT",
        _ => "other",
    }
}

/// Record one answered request.
pub fn record_request(method: &Method, outcome: &'static str, status: u16, started: Instant) {
    counter!(
        "travel_requests_total",
        "method" => method_label(method),
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("travel_request_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}
