//! Exponential backoff with optional jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before resubmission number `retries + 1`.
///
/// `retries` is the number of resubmissions already made, so the first
/// delay is `base_ms`, then doubling up to `max_ms`. Jitter adds up to
/// `jitter_ratio` of the capped delay on top.
pub fn calculate_backoff(retries: u32, base_ms: u64, max_ms: u64, jitter_ratio: f64) -> Duration {
    let exponential_base = 2u64.saturating_pow(retries);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = (capped_delay as f64 * jitter_ratio.clamp(0.0, 1.0)) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}
