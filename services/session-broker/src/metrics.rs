//! Prometheus metrics exposition
//!
//! Counters for the session lifecycle, rendered on `/metrics`:
//!
//! - `sessions_created_total` (counter): successful logins
//! - `sessions_rotated_total` (counter): successful refreshes
//! - `sessions_revoked_total` (counter): logouts
//! - `auth_rejected_total` (counter): label `reason` (`missing_token`, `expired`)

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering
/// metrics on the `/metrics` endpoint.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a successful login (session created).
pub fn record_session_created() {
    metrics::counter!("sessions_created_total").increment(1);
}

/// Record a successful refresh (session rotated).
pub fn record_session_rotated() {
    metrics::counter!("sessions_rotated_total").increment(1);
}

/// Record a logout (session revoked).
pub fn record_session_revoked() {
    metrics::counter!("sessions_revoked_total").increment(1);
}

/// Record a rejected request with the rejection reason as a label.
pub fn record_auth_rejected(reason: &'static str) {
    metrics::counter!("auth_rejected_total", "reason" => reason).increment(1);
}
