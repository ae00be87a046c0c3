//! Retry policy.

use crate::Error;
use std::time::Duration;

/// Decision for how to proceed after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Retry behavior for transient failures.
///
/// Transport errors and retryable upstream statuses (5xx, 429) are retried
/// with exponential backoff capped at `max_delay_ms`; an upstream
/// `Retry-After` hint takes precedence over the computed delay. Client
/// errors, validation failures, malformed responses, and cancellation are
/// never retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub min_delay_ms: u32,
    pub max_delay_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay_ms: 200,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries (the minimal observed contract).
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            min_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    fn backoff_delay(&self, attempt: u32, retry_after_ms: Option<u32>) -> Duration {
        let base = if self.min_delay_ms == 0 {
            0
        } else {
            // exponential backoff: min_delay * 2^attempt
            let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
            self.min_delay_ms.saturating_mul(factor)
        };
        let chosen = retry_after_ms.unwrap_or(base).min(self.max_delay_ms);
        Duration::from_millis(chosen as u64)
    }

    /// Decide what to do next after an attempt failed.
    ///
    /// `attempt` is 0-based (first failure => attempt=0).
    pub(crate) fn decide(&self, err: &Error, attempt: u32) -> Decision {
        if !err.is_retryable() || attempt >= self.max_retries {
            return Decision::Fail;
        }
        let retry_after_ms = match err {
            Error::Remote { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        };
        Decision::Retry {
            delay: self.backoff_delay(attempt, retry_after_ms),
        }
    }
}
