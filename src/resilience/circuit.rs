//! The call abstraction every decorator consumes and produces.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CallResult;
use crate::resilience::context::Context;
use crate::resilience::{circuit_breaker, debounce_first, debounce_last, retries};

/// Boxed future returned by a call.
pub type CallFuture = Pin<Box<dyn Future<Output = CallResult> + Send>>;

/// A callable that accepts a context and yields a payload or an error.
pub trait Call: Send + Sync + 'static {
    fn call(&self, ctx: Context) -> CallFuture;
}

/// Shared handle to a [`Call`].
///
/// Cloning is cheap and every clone drives the same underlying call, so a
/// decorated circuit can be handed to many concurrent callers.
#[derive(Clone)]
pub struct Circuit {
    inner: Arc<dyn Call>,
}

impl Circuit {
    pub fn new(call: impl Call) -> Self {
        Self {
            inner: Arc::new(call),
        }
    }

    /// Adapt an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallResult> + Send + 'static,
    {
        Self::new(FnCall(f))
    }

    /// Invoke the underlying call.
    pub fn call(&self, ctx: Context) -> CallFuture {
        self.inner.call(ctx)
    }

    /// Wrap with a circuit breaker opening after `failure_threshold` failures.
    pub fn with_breaker(self, failure_threshold: u32) -> Self {
        circuit_breaker::breaker(self, failure_threshold)
    }

    /// Wrap with up to `max_retries` re-invocations spaced by `delay`.
    pub fn with_retry(self, max_retries: u32, delay: Duration) -> Self {
        retries::retry(self, max_retries, delay)
    }

    /// Wrap so only the first call of a burst reaches the inner call.
    pub fn with_debounce_first(self, window: Duration) -> Self {
        debounce_first::debounce_first(self, window)
    }

    /// Wrap so only a call followed by `window` of quiet reaches the inner call.
    pub fn with_debounce_last(self, window: Duration) -> Self {
        debounce_last::debounce_last(self, window)
    }
}

impl Call for Circuit {
    fn call(&self, ctx: Context) -> CallFuture {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Circuit").finish_non_exhaustive()
    }
}

struct FnCall<F>(F);

impl<F, Fut> Call for FnCall<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallResult> + Send + 'static,
{
    fn call(&self, ctx: Context) -> CallFuture {
        Box::pin((self.0)(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_from_fn_forwards_context() {
        let circuit = Circuit::from_fn(|ctx: Context| async move {
            match ctx.err() {
                Some(err) => Err(err),
                None => Ok("pong".to_string()),
            }
        });

        assert_eq!(circuit.call(Context::background()).await.unwrap(), "pong");

        let ctx = Context::background();
        ctx.cancel();
        assert!(matches!(circuit.call(ctx).await, Err(CallError::Cancelled)));
    }

    #[tokio::test]
    async fn test_clones_share_the_call() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let circuit = Circuit::from_fn(move |_| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CallError>(String::new())
            }
        });
        let other = circuit.clone();
        circuit.call(Context::background()).await.unwrap();
        other.call(Context::background()).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
