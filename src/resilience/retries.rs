//! Retry logic.
//!
//! # Responsibilities
//! - Re-invoke a failed call up to `max_retries` times (`max_retries + 1` attempts)
//! - Wait a fixed delay between attempts
//! - Abort the wait as soon as the caller's context is done
//!
//! # Design Decisions
//! - Fixed delay, not exponential (the breaker owns the exponential schedule)
//! - Exhaustion is not a distinct error: the last attempt's error is returned
//! - Each retry is announced through `tracing`; the caller never sees it

use std::time::Duration;
use tokio::time::sleep;

use crate::observability::metrics;
use crate::resilience::circuit::{Call, CallFuture, Circuit};
use crate::resilience::context::Context;

/// Bounded, fixed-delay retry around a [`Circuit`].
#[derive(Debug, Clone)]
pub struct Retry {
    inner: Circuit,
    max_retries: u32,
    delay: Duration,
}

impl Retry {
    pub fn new(inner: Circuit, max_retries: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            delay,
        }
    }
}

impl Call for Retry {
    fn call(&self, ctx: Context) -> CallFuture {
        let Retry {
            inner,
            max_retries,
            delay,
        } = self.clone();

        Box::pin(async move {
            let mut attempt: u32 = 0;
            loop {
                let result = inner.call(ctx.clone()).await;
                let err = match result {
                    Ok(response) => return Ok(response),
                    Err(err) if attempt >= max_retries => return Err(err),
                    Err(err) => err,
                };

                attempt += 1;
                tracing::warn!(
                    attempt,
                    delay = ?delay,
                    error = %err,
                    "Attempt {} failed; retrying in {:?}",
                    attempt,
                    delay
                );
                metrics::record_retry_attempt();

                tokio::select! {
                    biased;
                    reason = ctx.done() => {
                        tracing::debug!(attempt, reason = %reason, "Retry wait aborted");
                        metrics::record_retry_cancelled();
                        return Err(reason);
                    }
                    _ = sleep(delay) => {}
                }
            }
        })
    }
}

/// Wrap `circuit` so failures are retried up to `max_retries` times with a
/// fixed `delay` between attempts.
pub fn retry(circuit: Circuit, max_retries: u32, delay: Duration) -> Circuit {
    Circuit::new(Retry::new(circuit, max_retries, delay))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;
    use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};

    /// Counts warn-level events emitted from this module.
    struct RetryNotices(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for RetryNotices {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
            let meta = event.metadata();
            if meta.target() == "stability::resilience::retries"
                && *meta.level() == tracing::Level::WARN
            {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Fails `failures` times, then succeeds.
    fn transient(failures: usize, count: Arc<AtomicUsize>) -> Circuit {
        Circuit::from_fn(move |_| {
            let count = count.clone();
            async move {
                let n = count.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    Err(CallError::upstream(format!("failure {}", n + 1)))
                } else {
                    Ok("success".to_string())
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_eventually_succeeds() {
        let count = Arc::new(AtomicUsize::new(0));
        let r = retry(transient(3, count.clone()), 5, Duration::from_secs(2));

        let start = Instant::now();
        let response = r.call(Context::background()).await.unwrap();
        assert_eq!(response, "success");
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted_returns_last_error() {
        let count = Arc::new(AtomicUsize::new(0));
        let r = retry(transient(10, count.clone()), 2, Duration::from_millis(10));

        let err = r.call(Context::background()).await.unwrap_err();
        assert_eq!(err.to_string(), "failure 3");
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_is_a_single_attempt() {
        let count = Arc::new(AtomicUsize::new(0));
        let r = retry(transient(1, count.clone()), 0, Duration::from_secs(1));

        assert!(r.call(Context::background()).await.unwrap_err().is_upstream());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let count = Arc::new(AtomicUsize::new(0));
        let r = retry(transient(10, count.clone()), 5, Duration::from_secs(60));
        let ctx = Context::background();

        let canceller = ctx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let err = r.call(ctx).await.unwrap_err();
        assert!(matches!(err, CallError::Cancelled));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_wait() {
        let count = Arc::new(AtomicUsize::new(0));
        let r = retry(transient(10, count.clone()), 5, Duration::from_secs(1));
        let ctx = Context::background().with_timeout(Duration::from_millis(2500));

        let err = r.call(ctx).await.unwrap_err();
        assert!(matches!(err, CallError::DeadlineExceeded));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_per_retry_not_on_final_attempt() {
        let notices = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(RetryNotices(notices.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let count = Arc::new(AtomicUsize::new(0));
        let r = retry(transient(3, count.clone()), 5, Duration::from_millis(10));
        r.call(Context::background()).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(notices.load(Ordering::SeqCst), 3);

        notices.store(0, Ordering::SeqCst);
        let count = Arc::new(AtomicUsize::new(0));
        let r = retry(transient(10, count.clone()), 2, Duration::from_millis(10));
        r.call(Context::background()).await.unwrap_err();
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(notices.load(Ordering::SeqCst), 2);
    }
}
