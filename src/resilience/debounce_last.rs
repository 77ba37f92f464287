//! Trailing-edge debounce.
//!
//! # States
//! ```text
//! Idle → Watching: first call after idle spawns the watcher
//! Watching → Fired → Idle: quiet window elapsed, wrapped call invoked once
//! Watching → Cancelled → Idle: caller's context done first, call never made
//! ```
//!
//! # Design Decisions
//! - Callers never wait on the wrapped call; they get the cached outcome,
//!   which may belong to an earlier window
//! - At most one watcher per instance, guarded by `watcher_active`
//! - The flag is cleared on every watcher exit path, panics included
//! - If calls arrive while the wrapped call is running, the watcher keeps
//!   watching the extended window instead of exiting

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::Instrument;

use crate::error::CallResult;
use crate::observability::metrics;
use crate::resilience::backoff::deadline_after;
use crate::resilience::circuit::{Call, CallFuture, Circuit};
use crate::resilience::context::Context;

/// Default watcher wake-up interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
struct DebounceLastState {
    quiet_until: Instant,
    cached: CallResult,
    watcher_active: bool,
}

#[derive(Debug)]
struct Shared {
    inner: Circuit,
    window: Duration,
    poll_interval: Duration,
    state: Mutex<DebounceLastState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, DebounceLastState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Trailing-edge debounce around a [`Circuit`].
#[derive(Debug, Clone)]
pub struct DebounceLast {
    shared: Arc<Shared>,
}

impl DebounceLast {
    pub fn new(inner: Circuit, window: Duration) -> Self {
        Self::with_poll_interval(inner, window, DEFAULT_POLL_INTERVAL)
    }

    /// A zero interval is raised to 1ms.
    pub fn with_poll_interval(inner: Circuit, window: Duration, poll_interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner,
                window,
                poll_interval: poll_interval.max(Duration::from_millis(1)),
                state: Mutex::new(DebounceLastState {
                    quiet_until: Instant::now(),
                    cached: Ok(String::new()),
                    watcher_active: false,
                }),
            }),
        }
    }

    /// True while a watcher task is alive.
    pub fn is_watching(&self) -> bool {
        self.shared.lock().watcher_active
    }
}

impl Call for DebounceLast {
    fn call(&self, ctx: Context) -> CallFuture {
        let shared = self.shared.clone();
        Box::pin(async move {
            let mut state = shared.lock();
            state.quiet_until = deadline_after(Instant::now(), shared.window);

            if !state.watcher_active {
                state.watcher_active = true;
                let guard = WatcherGuard {
                    shared: shared.clone(),
                    armed: true,
                };
                let span = tracing::debug_span!("debounce_last_watcher");
                tokio::spawn(watch(shared.clone(), ctx, guard).instrument(span));
            }

            state.cached.clone()
        })
    }
}

/// Clears `watcher_active` if the watcher exits without doing so itself.
struct WatcherGuard {
    shared: Arc<Shared>,
    armed: bool,
}

impl WatcherGuard {
    /// Clear the flag while the caller already holds the lock.
    fn release(&mut self, state: &mut DebounceLastState) {
        state.watcher_active = false;
        self.armed = false;
    }
}

impl Drop for WatcherGuard {
    fn drop(&mut self) {
        if self.armed {
            self.shared.lock().watcher_active = false;
        }
    }
}

async fn watch(shared: Arc<Shared>, ctx: Context, mut guard: WatcherGuard) {
    tracing::debug!(window = ?shared.window, "Watcher started");

    let period = shared.poll_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            reason = ctx.done() => {
                let mut state = shared.lock();
                tracing::debug!(reason = %reason, "Watcher cancelled before quiet window elapsed");
                state.cached = Err(reason);
                guard.release(&mut state);
                metrics::record_debounce_cancelled("last");
                return;
            }
            _ = ticker.tick() => {}
        }

        let fired_for = {
            let state = shared.lock();
            if Instant::now() < state.quiet_until {
                continue;
            }
            state.quiet_until
        };

        tracing::debug!("Quiet window elapsed, invoking wrapped call");
        let outcome = shared.inner.call(ctx.clone()).await;
        metrics::record_debounce_fired("last");

        let mut state = shared.lock();
        state.cached = outcome;
        if state.quiet_until > fired_for {
            tracing::debug!("Calls arrived during invocation, watching again");
            continue;
        }
        guard.release(&mut state);
        return;
    }
}

/// Wrap `circuit` so it only runs once `window` passes without a new call.
pub fn debounce_last(circuit: Circuit, window: Duration) -> Circuit {
    Circuit::new(DebounceLast::new(circuit, window))
}
