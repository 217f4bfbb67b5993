//! Prometheus metrics for backoffice-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Backend call duration histogram by operation.
pub static BACKEND_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "backoffice_backend_request_duration_seconds",
        "Booking backend request duration in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register backend_request_duration")
});

/// Backend failures by operation and kind (transport, timeout, decode or error kind).
pub static BACKEND_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_backend_errors_total",
        "Total number of failed booking backend calls",
        &["operation", "kind"]
    )
    .expect("Failed to register backend_errors_total")
});

/// Booking workflow actions by kind and outcome.
pub static BOOKING_ACTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_booking_actions_total",
        "Total number of booking actions",
        &["action", "outcome"] // list, view, cancel, reprice, manual_create, document
    )
    .expect("Failed to register booking_actions_total")
});

/// Breakdowns whose derived selling price disagrees with the quoted one.
pub static PRICE_DIVERGENCE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_price_divergence_total",
        "Total number of breakdowns diverging from the quoted selling price",
        &["currency"]
    )
    .expect("Failed to register price_divergence_total")
});

/// Registration attempts by outcome.
pub static REGISTRATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_registrations_total",
        "Total number of agency registrations by outcome",
        &["outcome"] // accepted, captcha_failed, rejected
    )
    .expect("Failed to register registrations_total")
});

/// Supplier mapping decisions.
pub static MAPPING_DECISIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_mapping_decisions_total",
        "Total number of supplier mapping decisions",
        &["entity", "status"]
    )
    .expect("Failed to register mapping_decisions_total")
});

/// Initialize all metrics (forces lazy initialization) and the HTTP
/// request recorder.
pub fn init_metrics() {
    service_core::middleware::metrics::install_recorder();
    Lazy::force(&BACKEND_REQUEST_DURATION);
    Lazy::force(&BACKEND_ERRORS_TOTAL);
    Lazy::force(&BOOKING_ACTIONS_TOTAL);
    Lazy::force(&PRICE_DIVERGENCE_TOTAL);
    Lazy::force(&REGISTRATIONS_TOTAL);
    Lazy::force(&MAPPING_DECISIONS_TOTAL);
}

/// Service and HTTP metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut body = encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default();
    body.push_str(&service_core::middleware::metrics::render());
    body
}

/// Count a booking action outcome.
pub fn record_action(action: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    BOOKING_ACTIONS_TOTAL
        .with_label_values(&[action, outcome])
        .inc();
}
