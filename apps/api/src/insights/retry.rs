//! Retry with exponential backoff for transient generation failures.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::llm_client::{ErrorKind, LlmError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

impl Retryable for LlmError {
    fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero behaves as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt at `attempt_index` (0-based): base * 2^index.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs `op` until it succeeds, fails permanently, or attempts run out.
///
/// Only transient errors are retried. The last error is returned as-is.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if attempt + 1 >= max_attempts || !error.is_transient() {
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        warn!(
            "Generation service overloaded, retrying in {}ms (attempt {}/{}): {}",
            delay.as_millis(),
            attempt + 1,
            max_attempts,
            error
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
