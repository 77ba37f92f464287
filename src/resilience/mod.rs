//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Caller holds a Circuit and invokes it like the raw upstream call:
//!     → circuit_breaker.rs (fail fast while the circuit is open)
//!     → retries.rs (re-invoke on failure, fixed delay, cancellable wait)
//!     → debounce_first.rs (first call of a burst runs, the rest read the cache)
//!     → debounce_last.rs (call runs once the burst goes quiet, background watcher)
//!     → wrapped upstream call
//! ```
//!
//! # Design Decisions
//! - Every decorator consumes and produces a `Circuit`, so they compose freely
//! - Each wrap call owns fresh state; no global state anywhere
//! - Every wait races the caller's `Context`
//! - Circuit-open and cancellation errors are distinct from upstream errors

pub mod backoff;
pub mod circuit;
pub mod circuit_breaker;
pub mod context;
pub mod debounce_first;
pub mod debounce_last;
pub mod retries;

pub use circuit::{Call, CallFuture, Circuit};
pub use circuit_breaker::{breaker, CircuitBreaker};
pub use context::Context;
pub use debounce_first::{debounce_first, DebounceFirst};
pub use debounce_last::{debounce_last, DebounceLast};
pub use retries::{retry, Retry};
