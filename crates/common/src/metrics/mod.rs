//! Metrics and observability utilities
//!
//! Prometheus-style metric descriptions and recording helpers with
//! standardized naming. The recorder itself is installed by the binaries;
//! without one every call here is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all tracker metrics
pub const METRICS_PREFIX: &str = "phdtrack";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Reconciliation metrics
    describe_counter!(
        format!("{}_entities_created_total", METRICS_PREFIX),
        Unit::Count,
        "Universities, departments, programs and research areas created on first reference"
    );

    describe_counter!(
        format!("{}_resolve_conflicts_total", METRICS_PREFIX),
        Unit::Count,
        "Concurrent inserts of the same name recovered by re-reading"
    );

    describe_counter!(
        format!("{}_professor_upserts_total", METRICS_PREFIX),
        Unit::Count,
        "Professor add/edit submissions committed"
    );

    describe_histogram!(
        format!("{}_professor_upsert_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Professor upsert transaction latency in seconds"
    );

    describe_counter!(
        format!("{}_professors_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Professors deleted"
    );

    describe_counter!(
        format!("{}_applicants_created_total", METRICS_PREFIX),
        Unit::Count,
        "Applicant profiles created"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// A lazily created university/department/program/research area
pub fn record_entity_created(kind: &'static str) {
    counter!(
        format!("{}_entities_created_total", METRICS_PREFIX),
        "kind" => kind
    )
    .increment(1);
}

/// A uniqueness violation that was recovered by re-reading the row
pub fn record_resolve_conflict(kind: &'static str) {
    counter!(
        format!("{}_resolve_conflicts_total", METRICS_PREFIX),
        "kind" => kind
    )
    .increment(1);
}

/// A committed professor upsert
pub fn record_professor_upsert(duration_secs: f64, mode: &'static str) {
    counter!(
        format!("{}_professor_upserts_total", METRICS_PREFIX),
        "mode" => mode
    )
    .increment(1);

    histogram!(
        format!("{}_professor_upsert_duration_seconds", METRICS_PREFIX),
        "mode" => mode
    )
    .record(duration_secs);
}

pub fn record_professor_deleted() {
    counter!(format!("{}_professors_deleted_total", METRICS_PREFIX)).increment(1);
}

pub fn record_applicant_created() {
    counter!(format!("{}_applicants_created_total", METRICS_PREFIX)).increment(1);
}
