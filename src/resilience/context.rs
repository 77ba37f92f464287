//! Cancellation context threaded through every call and every wait.
//!
//! # Responsibilities
//! - Carry a cancellation signal (a `CancellationToken`)
//! - Carry an optional deadline
//! - Report why the context is done
//!
//! # Design Decisions
//! - Cloning is cheap; clones observe the same signal
//! - Child contexts are cancelled with their parent, never the other way round
//! - Deadlines use `tokio::time::Instant` so paused test clocks apply

use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::CallError;

/// Cancellation and deadline signal passed to every call.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done unless cancelled explicitly.
    pub fn background() -> Self {
        Self::default()
    }

    /// Build a context observing an existing token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a context that is cancelled with this one but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a child context that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(at) => self.with_deadline(at),
            None => self.child(),
        }
    }

    /// Derive a child context that expires at `at`. The earlier deadline wins.
    pub fn with_deadline(&self, at: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current <= at => current,
            _ => at,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// The reason this context is done, if it is.
    pub fn err(&self) -> Option<CallError> {
        if self.token.is_cancelled() {
            return Some(CallError::Cancelled);
        }
        match self.deadline {
            Some(at) if Instant::now() >= at => Some(CallError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Wait until the context is done and return the reason.
    pub async fn done(&self) -> CallError {
        match self.deadline {
            Some(at) => tokio::select! {
                biased;
                _ = self.token.cancelled() => CallError::Cancelled,
                _ = sleep_until(at) => CallError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                CallError::Cancelled
            }
        }
    }
}

impl From<CancellationToken> for Context {
    fn from(token: CancellationToken) -> Self {
        Self::from_token(token)
    }
}
