//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::{
    circuit_breaker::CircuitBreaker, debounce_first::DebounceFirst, debounce_last::DebounceLast,
    retries::Retry, Circuit,
};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StabilityConfig {
    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Retry settings.
    pub retry: RetryConfig,

    /// Debounce settings (shared by leading and trailing debounce).
    pub debounce: DebounceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures tolerated before the circuit opens.
    pub failure_threshold: u32,

    /// Cool-down at the threshold in milliseconds; doubles per extra failure.
    pub base_cooldown_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            base_cooldown_ms: 2000,
        }
    }
}

impl BreakerConfig {
    pub fn base_cooldown(&self) -> Duration {
        Duration::from_millis(self.base_cooldown_ms)
    }

    pub fn wrap(&self, circuit: Circuit) -> Circuit {
        let breaker = CircuitBreaker::new(circuit, self.failure_threshold)
            .with_base_cooldown(self.base_cooldown());
        Circuit::new(breaker)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Re-invocations after the first attempt.
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 500,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn wrap(&self, circuit: Circuit) -> Circuit {
        Circuit::new(Retry::new(circuit, self.max_retries, self.delay()))
    }
}

/// Debounce configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Suppression / quiet window in milliseconds.
    pub window_ms: u64,

    /// Trailing debounce watcher wake-up interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            window_ms: 100,
            poll_interval_ms: 100,
        }
    }
}

impl DebounceConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn wrap_first(&self, circuit: Circuit) -> Circuit {
        Circuit::new(DebounceFirst::new(circuit, self.window()))
    }

    pub fn wrap_last(&self, circuit: Circuit) -> Circuit {
        Circuit::new(DebounceLast::with_poll_interval(
            circuit,
            self.window(),
            self.poll_interval(),
        ))
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
