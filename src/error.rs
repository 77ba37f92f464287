//! Error types shared by every decorator.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error accepted from wrapped calls.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Outcome of a wrapped call.
pub type CallResult = Result<String, CallError>;

/// Errors surfaced by a [`Circuit`](crate::Circuit).
///
/// `Clone` so that debounced results can be replayed to many callers.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    /// Whatever the wrapped call returned, passed through unchanged.
    #[error("{0}")]
    Upstream(Arc<dyn StdError + Send + Sync>),

    /// The breaker refused to invoke the wrapped call.
    #[error("unreachable service")]
    CircuitOpen,

    /// The caller's context was cancelled.
    #[error("context canceled")]
    Cancelled,

    /// The caller's context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl CallError {
    /// Wrap an upstream failure.
    pub fn upstream(err: impl Into<BoxError>) -> Self {
        let boxed: BoxError = err.into();
        CallError::Upstream(Arc::from(boxed))
    }

    /// True for both cancellation kinds.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CallError::Cancelled | CallError::DeadlineExceeded)
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CallError::CircuitOpen)
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, CallError::Upstream(_))
    }
}
