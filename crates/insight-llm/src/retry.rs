//! Bounded retry with exponential backoff and jitter around a fallible call.

use crate::{LlmError, Result};
use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_millis(500),
        }
    }

    /// One attempt, no retries.
    pub fn single() -> Self {
        Self::new(1)
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Total number of calls allowed. Never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before the retry that follows failed attempt `attempt` (1-based),
    /// excluding jitter: `base_delay * 2^(attempt-1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// `op` receives the 1-based attempt number. A final timeout is returned
/// as-is; any other final failure is wrapped in [`LlmError::RetriesExhausted`]
/// when more than one attempt was made.
pub async fn run<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        info!("{}: attempt {}/{}", label, attempt, attempts);
        let start = Instant::now();

        match op(attempt).await {
            Ok(value) => {
                info!(
                    "{}: succeeded on attempt {} (took {:?})",
                    label,
                    attempt,
                    start.elapsed()
                );
                return Ok(value);
            }
            Err(e) if attempt >= attempts => {
                error!("{}: giving up after {} attempt(s): {}", label, attempt, e);
                if e.is_timeout() || attempts == 1 {
                    return Err(e);
                }
                return Err(LlmError::RetriesExhausted {
                    attempts,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                let delay = policy.backoff(attempt) + policy.jitter();
                if e.is_timeout() {
                    warn!("{}: request timed out, retrying in {:?}", label, delay);
                } else {
                    warn!("{}: attempt {} failed: {}, retrying in {:?}", label, attempt, e, delay);
                }
                sleep(delay).await;
            }
        }
    }
}
