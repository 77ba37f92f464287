//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → StabilityConfig (validated, immutable)
//!     → each section builds its decorator around a Circuit
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Durations are plain millisecond integers in the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::StabilityConfig;
pub use schema::BreakerConfig;
pub use schema::RetryConfig;
pub use schema::DebounceConfig;
pub use schema::ObservabilityConfig;
