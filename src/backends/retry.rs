//! Exponential backoff with jitter for flaky remote calls.
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random(0..=jitter)
//! ```
//!
//! With the defaults a call is tried six times in all, waiting roughly
//! 1s, 2s, 4s, 8s and 16s in between. The last error is returned once the
//! retries are used up.

use crate::error::Result;
use rand::{Rng, rng};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(250),
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (1-based), without jitter.
    pub fn delay(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(16) as u32;
        self.base_delay.saturating_mul(1 << shift).min(self.max_delay)
    }

    fn jittered(&self, attempt: usize) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        let jitter_ms = if max_ms == 0 {
            0
        } else {
            rng().random_range(0..=max_ms)
        };
        self.delay(attempt) + Duration::from_millis(jitter_ms)
    }

    /// Run `op` until it succeeds or the retries run out.
    ///
    /// `what` names the operation in the logs.
    pub async fn retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            attempt += 1;
            let elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64;
            let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

            if attempt > self.max_retries {
                error!(
                    what,
                    attempt,
                    max = self.max_retries,
                    elapsed_ms_attempt,
                    elapsed_ms_total,
                    error = %err,
                    "Retries exhausted"
                );
                return Err(err);
            }

            let delay = self.jittered(attempt);
            warn!(
                what,
                attempt,
                max = self.max_retries,
                elapsed_ms_attempt,
                elapsed_ms_total,
                ?delay,
                error = %err,
                "Attempt failed; backing off"
            );
            sleep(delay).await;
        }
    }
}
