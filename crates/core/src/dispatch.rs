//! Dispatch limits, timeouts, and backoff schedule for image generation.
//!
//! The defaults are fixed by the booth: two jobs in flight, a little over
//! two minutes per attempt, and five attempts with doubling delays between
//! them.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of jobs allowed to execute at the same time.
pub const MAX_CONCURRENT_JOBS: usize = 2;

/// Per-attempt deadline for the remote call, in milliseconds.
pub const ATTEMPT_TIMEOUT_MS: u64 = 123_333;

/// Total number of attempts per job, including the first one.
pub const MAX_ATTEMPTS: u32 = 5;

/// Delay before the second attempt, in milliseconds.
pub const BASE_BACKOFF_MS: u64 = 1_233;

/// Factor by which the delay grows after each failed attempt.
pub const BACKOFF_MULTIPLIER: u32 = 2;

// ---------------------------------------------------------------------------
// DispatchConfig
// ---------------------------------------------------------------------------

/// Tunable parameters for the dispatcher.
///
/// [`DispatchConfig::default`] yields the booth's fixed values. The fields
/// are public so embedders can narrow them, e.g. a single-slot dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Concurrency budget. Must be at least 1.
    pub max_concurrent: usize,
    /// Deadline for a single attempt.
    pub attempt_timeout: Duration,
    /// Total attempts per job. Must be at least 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_backoff: Duration,
    /// Growth factor applied per attempt.
    pub backoff_multiplier: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: MAX_CONCURRENT_JOBS,
            attempt_timeout: Duration::from_millis(ATTEMPT_TIMEOUT_MS),
            max_attempts: MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(BASE_BACKOFF_MS),
            backoff_multiplier: BACKOFF_MULTIPLIER,
        }
    }
}

impl DispatchConfig {
    /// Delay to wait after the attempt with 0-based index `attempt` fails.
    ///
    /// `base * multiplier^attempt`, saturating instead of overflowing:
    /// 1233, 2466, 4932, 9864, 19728 ms with the defaults.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.saturating_pow(attempt);
        self.base_backoff.saturating_mul(factor)
    }

    /// Whether the attempt with 0-based index `attempt` is the last one.
    pub fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt + 1 >= self.max_attempts
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
