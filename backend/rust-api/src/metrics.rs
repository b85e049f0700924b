use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref ANSWERS_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_submitted_total",
        "Total number of answers submitted",
        &["correct"]
    )
    .unwrap();

    pub static ref POINTS_AWARDED_TOTAL: IntCounter = register_int_counter!(
        "points_awarded_total",
        "Total points granted on solved transitions"
    )
    .unwrap();

    pub static ref VISITS_RECORDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "visits_recorded_total",
        "Total study/practice page visits recorded",
        &["kind"]
    )
    .unwrap();

    pub static ref BATCH_UNITS_RESOLVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "batch_units_resolved_total",
        "Per-unit outcomes of batch progress queries",
        &["outcome"]
    )
    .unwrap();

    pub static ref WRONG_ANSWER_QUERIES_TOTAL: IntCounter = register_int_counter!(
        "wrong_answer_queries_total",
        "Total wrong-answer projection queries served"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Record one per-unit batch outcome ("ok" or "fallback")
pub fn record_batch_outcome(outcome: &str) {
    BATCH_UNITS_RESOLVED_TOTAL
        .with_label_values(&[outcome])
        .inc();
}
