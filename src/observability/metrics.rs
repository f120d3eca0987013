//! Dispatch metrics.
//!
//! # Metrics
//! - `client_requests_total` (counter): dispatches by method and outcome
//! - `client_request_duration_seconds` (histogram): dispatch latency
//!
//! Outcome is `completed` or the error kind (`transport`, `cancelled`, ...).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn recording on or off process-wide.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Record one finished dispatch.
pub fn record_dispatch(method: &str, outcome: &'static str, started: Instant) {
    if !is_enabled() {
        return;
    }
    let method = method.to_string();
    metrics::counter!(
        "client_requests_total",
        "method" => method.clone(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("client_request_duration_seconds", "method" => method)
        .record(started.elapsed().as_secs_f64());
}
