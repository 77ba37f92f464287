//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Decorators produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via `metrics`)
//!
//! Consumers:
//!     → whatever subscriber / recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder itself
//! - Metrics are no-ops until a recorder is installed
//! - Retry notices are the only way to observe that retries happened

pub mod logging;
pub mod metrics;
