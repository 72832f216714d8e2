//! Metrics collection.
//!
//! # Metrics
//! - `ride_client_requests_total` (counter): submissions by actor, method, status
//! - `ride_client_request_duration_seconds` (histogram): submission latency
//! - `ride_client_network_retries_total` (counter): backoff resubmissions
//! - `ride_client_refresh_total` (counter): refresh flights by outcome
//! - `ride_client_session_expired_total` (counter): forced logouts
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding app installs the
//!   exporter (without one, every call is a no-op)
//! - Status `0` stands for "no response"

use std::time::Duration;

use crate::pipeline::refresh::RefreshOutcome;
use crate::routing::Actor;

/// Record one transport submission.
pub fn record_request(actor: Actor, method: &str, status: u16, latency: Duration) {
    metrics::counter!(
        "ride_client_requests_total",
        "actor" => actor.as_str(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "ride_client_request_duration_seconds",
        "actor" => actor.as_str()
    )
    .record(latency.as_secs_f64());
}

pub fn record_network_retry(actor: Actor) {
    metrics::counter!("ride_client_network_retries_total", "actor" => actor.as_str()).increment(1);
}

pub fn record_refresh(actor: Actor, outcome: RefreshOutcome) {
    metrics::counter!(
        "ride_client_refresh_total",
        "actor" => actor.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_session_expired(actor: Actor) {
    metrics::counter!("ride_client_session_expired_total", "actor" => actor.as_str()).increment(1);
}
