//! Rewrite API calls with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`RewriteProvider`]: core trait for one rewrite round trip
//! - [`RetryRewrite`]: decorator that adds retry logic to any provider
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```
//!
//! Only [`NewsError::RewriteUnavailable`] (transport errors and error
//! statuses) is retried. A well-formed `success: false` answer is final
//! whatever its message says.
//!
//! [`NewsError::RewriteUnavailable`]: crate::error::NewsError::RewriteUnavailable

use crate::error::Result;
use crate::rewrite::{RewriteProvider, RewriteRequest};
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Default retry budget for the remote rewrite service.
pub const DEFAULT_MAX_RETRIES: usize = 2;
pub const DEFAULT_BASE_DELAY: StdDuration = StdDuration::from_millis(500);
pub const DEFAULT_MAX_DELAY: StdDuration = StdDuration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: StdDuration,
    pub max_delay: StdDuration,
    /// Upper bound of the random jitter added to every delay, in ms.
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = attempt.saturating_sub(1).min(31) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    fn delay(&self, attempt: usize) -> StdDuration {
        let jitter_ms: u64 = if self.jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=self.jitter_ms)
        };
        self.backoff(attempt) + StdDuration::from_millis(jitter_ms)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`RewriteProvider`].
pub struct RetryRewrite<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: RewriteProvider> RetryRewrite<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<T> fmt::Debug for RetryRewrite<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryRewrite")
            .field("max_retries", &self.policy.max_retries)
            .field("base_delay", &self.policy.base_delay)
            .field("max_delay", &self.policy.max_delay)
            .finish()
    }
}

impl<T: RewriteProvider> RewriteProvider for RetryRewrite<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    #[instrument(level = "info", skip_all, fields(provider = self.inner.name()))]
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.rewrite(request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.policy.max_retries || !e.is_transient() {
                        error!(
                            attempt,
                            max = self.policy.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "rewrite() giving up"
                        );
                        return Err(e);
                    }

                    let delay = self.policy.delay(attempt);
                    warn!(
                        attempt,
                        max = self.policy.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "rewrite() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
