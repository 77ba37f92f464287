//! Exponential cool-down schedule for the circuit breaker.

use std::time::Duration;
use tokio::time::Instant;

/// Base cool-down once the failure threshold is reached.
pub const DEFAULT_BASE_COOLDOWN: Duration = Duration::from_secs(2);

/// Cool-down after `overflow` failures beyond the threshold: `base × 2^overflow`.
///
/// Saturates at `Duration::MAX` rather than overflowing.
pub fn calculate_cooldown(overflow: u32, base: Duration) -> Duration {
    let factor = match 1u32.checked_shl(overflow) {
        Some(factor) => factor,
        None => return Duration::MAX,
    };
    base.checked_mul(factor).unwrap_or(Duration::MAX)
}

/// `from + after`, clamped to roughly thirty years out instead of overflowing.
pub(crate) fn deadline_after(from: Instant, after: Duration) -> Instant {
    const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);
    from.checked_add(after.min(FAR_FUTURE)).unwrap_or(from)
}
