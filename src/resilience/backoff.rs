//! Exponential backoff with jitter for poll spacing.

use rand::Rng;
use std::time::Duration;

/// Delay after poll `attempt` when backing off exponentially.
///
/// Attempt 1 waits `base`, each later attempt doubles it, capped at `max`,
/// plus up to 10% jitter. Attempt 0 waits nothing.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    let capped = uncapped_or_max(attempt, base, max);
    capped + jitter(capped, &mut rand::thread_rng())
}

fn uncapped_or_max(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let factor = 2u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(max).min(max)
}

fn jitter(delay: Duration, rng: &mut impl Rng) -> Duration {
    let range_ms = (delay.as_millis() / 10) as u64;
    if range_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng.gen_range(0..range_ms))
}
