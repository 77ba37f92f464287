//! Resilience decorators for outbound calls to unreliable dependencies.
//!
//! Every decorator wraps a [`Circuit`] and returns a new `Circuit` of the same
//! shape, so they stack:
//!
//! ```no_run
//! use std::time::Duration;
//! use stability::{CallError, Circuit, Context};
//!
//! # async fn demo() -> Result<(), CallError> {
//! let upstream = Circuit::from_fn(|_ctx: Context| async move {
//!     Ok::<_, CallError>("pong".to_string())
//! });
//!
//! let guarded = upstream
//!     .with_breaker(3)
//!     .with_retry(2, Duration::from_millis(200));
//!
//! let response = guarded.call(Context::background()).await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;

pub use config::StabilityConfig;
pub use error::{BoxError, CallError, CallResult};
pub use resilience::{
    breaker, debounce_first, debounce_last, retry, Call, CallFuture, Circuit, CircuitBreaker,
    Context, DebounceFirst, DebounceLast, Retry,
};
