//! Metrics collection.
//!
//! # Metrics
//! - `stability_breaker_calls_total` (counter): by outcome (success, failure, rejected)
//! - `stability_retry_attempts_total` (counter): retries scheduled
//! - `stability_retry_cancelled_total` (counter): retry waits aborted by the context
//! - `stability_debounce_suppressed_total` (counter): calls answered from cache
//! - `stability_debounce_fired_total` (counter): wrapped calls actually made
//! - `stability_debounce_cancelled_total` (counter): watchers cancelled before firing

use metrics::counter;

pub fn record_breaker_call(outcome: &'static str) {
    counter!("stability_breaker_calls_total", "outcome" => outcome).increment(1);
}

pub fn record_retry_attempt() {
    counter!("stability_retry_attempts_total").increment(1);
}

pub fn record_retry_cancelled() {
    counter!("stability_retry_cancelled_total").increment(1);
}

pub fn record_debounce_suppressed(kind: &'static str) {
    counter!("stability_debounce_suppressed_total", "kind" => kind).increment(1);
}

pub fn record_debounce_fired(kind: &'static str) {
    counter!("stability_debounce_fired_total", "kind" => kind).increment(1);
}

pub fn record_debounce_cancelled(kind: &'static str) {
    counter!("stability_debounce_cancelled_total", "kind" => kind).increment(1);
}
