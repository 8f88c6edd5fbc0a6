//! Retry policies with exponential backoff
//!
//! A [`Retry`] pairs a [`RetryPolicy`] with the class of errors it handles.
//! The session stacks two of them around every request: one for plain
//! connectivity failures and a much more patient one for rate limiting.
//! Each only looks at its own class of error, so an error the inner policy
//! gives up on can still be retried by the outer one.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ToonError};

/// Backoff parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_tries: u32,

    /// Delay before the first retry, doubled for every further retry
    pub base_delay_ms: u64,

    /// Pick the actual delay uniformly between zero and the backoff
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_jitter() -> bool {
    true
}

impl RetryPolicy {
    pub const fn new(max_tries: u32, base_delay: Duration) -> Self {
        Self {
            max_tries,
            base_delay_ms: base_delay.as_millis() as u64,
            jitter: true,
        }
    }

    /// Policy for connection failures and timeouts: 3 tries, 1 s base
    pub const fn connection() -> Self {
        Self::new(3, Duration::from_secs(1))
    }

    /// Policy for HTTP 429: 6 tries, 60 s base
    pub const fn rate_limit() -> Self {
        Self::new(6, Duration::from_secs(60))
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Backoff before retry number `retry` (starting at 1), without jitter
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    fn delay(&self, retry: u32) -> Duration {
        let backoff = self.backoff(retry);
        if self.jitter && !backoff.is_zero() {
            let millis = backoff.as_millis().min(u64::MAX as u128) as u64;
            Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
        } else {
            backoff
        }
    }
}

/// A policy bound to the errors it retries
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    name: &'static str,
    policy: RetryPolicy,
    retry_on: fn(&ToonError) -> bool,
}

impl Retry {
    pub fn on(name: &'static str, policy: RetryPolicy, retry_on: fn(&ToonError) -> bool) -> Self {
        Self {
            name,
            policy,
            retry_on,
        }
    }

    /// Retries connection failures and timeouts, but not rate limiting
    pub fn connection(policy: RetryPolicy) -> Self {
        Self::on("connection", policy, |e| {
            e.is_connection_error() && !e.is_rate_limit()
        })
    }

    /// Retries rate limiting only
    pub fn rate_limit(policy: RetryPolicy) -> Self {
        Self::on("rate_limit", policy, ToonError::is_rate_limit)
    }

    /// Run `operation` until it succeeds, fails with an error this policy
    /// does not handle, or runs out of tries. The last error is returned as is.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_tries = self.policy.max_tries.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Err(e) if attempt < max_tries && (self.retry_on)(&e) => {
                    let delay = self.policy.delay(attempt);
                    warn!(
                        policy = self.name,
                        attempt,
                        max_tries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Request failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
