//! Bounded exponential backoff around remote calls.

use anyhow::{Result, anyhow};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// One attempt, no backoff. Used for non-critical spot checks.
    pub fn single() -> Self {
        Self {
            attempts: 1,
            initial_delay: Duration::ZERO,
        }
    }
}

/// Run `f` until it succeeds or the policy is exhausted, doubling the delay
/// between attempts. The last error is returned once attempts run out.
pub async fn with_backoff<T, F, Fut>(policy: RetryPolicy, what: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut last_err = None;

    for attempt in 1..=attempts {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                warn!("{what}: attempt {attempt}/{attempts} failed: {e:#}");
                last_err = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("{what}: retry exhausted")))
}
