//! Leading-edge debounce.
//!
//! The first call of a burst reaches the wrapped call; every call that arrives
//! before the suppression window lapses gets the cached outcome instead. Every
//! call, suppressed or not, pushes the window out by `window`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::CallResult;
use crate::observability::metrics;
use crate::resilience::backoff::deadline_after;
use crate::resilience::circuit::{Call, CallFuture, Circuit};
use crate::resilience::context::Context;

#[derive(Debug)]
struct DebounceFirstState {
    /// `None` until the first call completes.
    suppress_until: Option<Instant>,
    cached: CallResult,
}

#[derive(Debug, Clone)]
pub struct DebounceFirst {
    inner: Circuit,
    window: Duration,
    state: Arc<Mutex<DebounceFirstState>>,
}

impl DebounceFirst {
    pub fn new(inner: Circuit, window: Duration) -> Self {
        Self {
            inner,
            window,
            state: Arc::new(Mutex::new(DebounceFirstState {
                suppress_until: None,
                cached: Ok(String::new()),
            })),
        }
    }
}

impl Call for DebounceFirst {
    fn call(&self, ctx: Context) -> CallFuture {
        let debounce = self.clone();
        Box::pin(async move {
            // Held across the wrapped call: callers in the same burst queue
            // behind the first one and then read its outcome.
            let mut state = debounce.state.lock().await;

            let suppressed = matches!(state.suppress_until, Some(until) if Instant::now() < until);
            if suppressed {
                tracing::trace!("Call suppressed, returning cached result");
                metrics::record_debounce_suppressed("first");
            } else {
                state.cached = debounce.inner.call(ctx).await;
                metrics::record_debounce_fired("first");
            }

            state.suppress_until = Some(deadline_after(Instant::now(), debounce.window));
            state.cached.clone()
        })
    }
}

/// Wrap `circuit` so only the first call of each burst reaches it.
pub fn debounce_first(circuit: Circuit, window: Duration) -> Circuit {
    Circuit::new(DebounceFirst::new(circuit, window))
}
