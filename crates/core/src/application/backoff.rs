// Exponential backoff policy
//
// delay = min(base^attempts, 3600) whole seconds

use chrono::{DateTime, Duration, Utc};

use crate::application::worker::constants::{FALLBACK_BACKOFF_BASE, MAX_BACKOFF_SECS};

/// Compute the retry delay for a given failure count.
///
/// `attempts` below zero is treated as zero; a `base` below 1.0 falls back
/// to 2.0. The result is capped at one hour and truncated to whole seconds.
pub fn backoff(attempts: i32, base: f64) -> Duration {
    let attempts = attempts.max(0);
    let base = if base < 1.0 { FALLBACK_BACKOFF_BASE } else { base };

    let delay_secs = base.powi(attempts).min(MAX_BACKOFF_SECS);

    Duration::seconds(delay_secs as i64)
}

/// Earliest time the next retry may be claimed
pub fn next_retry_at(now: DateTime<Utc>, attempts: i32, base: f64) -> DateTime<Utc> {
    now + backoff(attempts, base)
}
