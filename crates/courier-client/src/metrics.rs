//! Metrics for the token lifecycle
//!
//! - `courier_token_refresh_total` (counter): label `outcome` (`success`/`failure`)
//! - `courier_request_retries_total` (counter): requests replayed after a refresh
//!
//! Recorded through the `metrics` facade; the embedding application decides
//! whether and where to install a recorder. Without one, these are no-ops.

/// Record a completed refresh episode.
pub fn record_refresh(outcome: &str) {
    metrics::counter!("courier_token_refresh_total", "outcome" => outcome.to_string())
        .increment(1);
}

/// Record a request replayed with a fresh token.
pub fn record_retry() {
    metrics::counter!("courier_request_retries_total").increment(1);
}
