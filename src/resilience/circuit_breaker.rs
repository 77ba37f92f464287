//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: consecutive failures below threshold, calls pass through
//! - Open: threshold reached, calls fail fast until the cool-down elapses
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= threshold
//! Open → (probe): now > last_attempt + 2s × 2^(consecutive_failures - threshold)
//! probe succeeds → Closed (counter reset to 0)
//! probe fails → Open with a doubled cool-down
//! ```
//!
//! # Design Decisions
//! - One breaker per wrapped call (no global state)
//! - The lock is released around the wrapped call; concurrent callers may all
//!   pass the check while the circuit is marginal
//! - Short-circuits return `CallError::CircuitOpen`, never the upstream error

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::CallError;
use crate::observability::metrics;
use crate::resilience::backoff::{calculate_cooldown, DEFAULT_BASE_COOLDOWN};
use crate::resilience::circuit::{Call, CallFuture, Circuit};
use crate::resilience::context::Context;

#[derive(Debug)]
struct BreakerState {
    consecutive_failures: u32,
    last_attempt: Instant,
}

/// Consecutive-failure circuit breaker around a [`Circuit`].
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    inner: Circuit,
    failure_threshold: u32,
    base_cooldown: Duration,
    state: Arc<RwLock<BreakerState>>,
}

impl CircuitBreaker {
    pub fn new(inner: Circuit, failure_threshold: u32) -> Self {
        Self {
            inner,
            failure_threshold,
            base_cooldown: DEFAULT_BASE_COOLDOWN,
            state: Arc::new(RwLock::new(BreakerState {
                consecutive_failures: 0,
                last_attempt: Instant::now(),
            })),
        }
    }

    /// Override the 2 second base of the cool-down schedule.
    pub fn with_base_cooldown(mut self, base: Duration) -> Self {
        self.base_cooldown = base;
        self
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .consecutive_failures
    }

    /// True if a call made now would be short-circuited.
    pub fn is_open(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        self.rejects(&state, Instant::now())
    }

    fn rejects(&self, state: &BreakerState, now: Instant) -> bool {
        let Some(overflow) = state.consecutive_failures.checked_sub(self.failure_threshold) else {
            return false;
        };
        let cooldown = calculate_cooldown(overflow, self.base_cooldown);
        match state.last_attempt.checked_add(cooldown) {
            Some(retry_at) => now <= retry_at,
            None => true,
        }
    }

    fn record(&self, success: bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.last_attempt = Instant::now();

        if success {
            if state.consecutive_failures >= self.failure_threshold {
                tracing::info!(
                    failures = state.consecutive_failures,
                    "Circuit closed after successful probe"
                );
            }
            state.consecutive_failures = 0;
            metrics::record_breaker_call("success");
        } else {
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
            if state.consecutive_failures == self.failure_threshold {
                tracing::warn!(
                    threshold = self.failure_threshold,
                    "Failure threshold reached, opening circuit"
                );
            }
            metrics::record_breaker_call("failure");
        }
    }
}

impl Call for CircuitBreaker {
    fn call(&self, ctx: Context) -> CallFuture {
        let breaker = self.clone();
        Box::pin(async move {
            {
                let state = breaker.state.read().unwrap_or_else(PoisonError::into_inner);
                if breaker.rejects(&state, Instant::now()) {
                    tracing::debug!(
                        failures = state.consecutive_failures,
                        "Circuit open, short-circuiting call"
                    );
                    metrics::record_breaker_call("rejected");
                    return Err(CallError::CircuitOpen);
                }
            }

            let result = breaker.inner.call(ctx).await;
            breaker.record(result.is_ok());
            result
        })
    }
}

/// Wrap `circuit` with a breaker that opens after `failure_threshold`
/// consecutive failures.
pub fn breaker(circuit: Circuit, failure_threshold: u32) -> Circuit {
    Circuit::new(CircuitBreaker::new(circuit, failure_threshold))
}
