//! Retry and status-classification helpers.
//!
//! # Examples
//!
//! ```
//! use ipfs_http_client::client::{backoff_delay, is_retryable_status};
//! use std::time::Duration;
//!
//! // 5xx and the daemon's startup-window 404 are transient
//! assert!(is_retryable_status(503));
//! assert!(is_retryable_status(404));
//! assert!(!is_retryable_status(400));
//!
//! // Jittered exponential backoff, median base_ms * 2^attempt
//! let delay = backoff_delay(0, 1000);
//! assert!(delay >= Duration::from_millis(500) && delay <= Duration::from_millis(1501));
//! ```

use rand::Rng;
use std::time::Duration;

/// Whether a non-success status should be retried.
///
/// 5xx covers transient daemon-side failures. 404 is included because the
/// daemon can transiently 404 right after startup, before its routes are
/// registered; a 404 that survives the whole attempt budget is classified
/// as an unknown command by the caller.
pub fn is_retryable_status(status: u16) -> bool {
    status == 404 || (500..=599).contains(&status)
}

/// Compute the delay before retry number `attempt` (zero-based).
///
/// Exponential growth with decorrelated jitter: the median delay is
/// `base_ms * 2^attempt` and each sample is drawn uniformly from half to
/// one-and-a-half times that, so concurrent callers do not retry in
/// lockstep. The exponent is capped to keep the arithmetic in range.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let median = base_ms.saturating_mul(1u64 << attempt.min(10));
    let low = median / 2;
    let high = median.saturating_add(median / 2).max(low + 1);
    let jittered = rand::thread_rng().gen_range(low..=high);
    Duration::from_millis(jittered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(502));
        assert!(is_retryable_status(599));
        assert!(is_retryable_status(404));
        assert!(!is_retryable_status(200));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(403));
    }

    #[test]
    fn backoff_grows_and_stays_within_bounds() {
        for attempt in 0..5 {
            let median = 1000u64 * (1 << attempt);
            for _ in 0..50 {
                let delay = backoff_delay(attempt, 1000);
                assert!(delay >= Duration::from_millis(median / 2));
                assert!(delay <= Duration::from_millis(median + median / 2 + 1));
            }
        }
    }

    #[test]
    fn backoff_exponent_is_capped() {
        // Large attempt numbers must not overflow.
        let delay = backoff_delay(64, u64::MAX / 4);
        assert!(delay > Duration::ZERO);
    }
}
