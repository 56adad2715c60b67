// Worker constants (no magic values in call sites)

use std::time::Duration;

/// Poll interval of the worker run loop (1s)
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Hard wall-clock timeout for one command execution (5 minutes)
pub const EXECUTION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Claim lease duration in seconds (10 minutes).
/// Twice the execution timeout, so a live worker's lease always outlasts
/// its longest possible command; a lapsed lease marks a crashed claimant.
pub const CLAIM_LEASE_SECS: i64 = 2 * 5 * 60;

/// Upper bound on a computed backoff delay (1 hour)
pub const MAX_BACKOFF_SECS: f64 = 3600.0;

/// Backoff base used when the configured base is below 1.0
pub const FALLBACK_BACKOFF_BASE: f64 = 2.0;
