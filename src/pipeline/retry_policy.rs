//! Rate-limit handling for calls to the video platform.
//!
//! When the platform throttles us the whole stage sleeps for a fixed backoff and
//! then retries the same row.

use crate::collaborators::FetchError;
use crate::config::DEFAULT_RATE_LIMIT_BACKOFF_SECS;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitPolicy {
    /// Sleep between a throttled call and its retry.
    pub backoff: Duration,
    /// Give up after this many sleeps. `None` retries forever.
    pub max_waits: Option<u32>,
}

impl RateLimitPolicy {
    pub fn new(backoff: Duration) -> Self {
        Self {
            backoff,
            max_waits: None,
        }
    }

    pub fn with_max_waits(mut self, max_waits: u32) -> Self {
        self.max_waits = Some(max_waits);
        self
    }

    /// Run `op`, sleeping and retrying while it reports `RateLimited`.
    ///
    /// Any other outcome is returned as is. Once `max_waits` is exhausted the
    /// `RateLimited` error is returned to the caller.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut waits = 0u32;
        loop {
            match op().await {
                Err(FetchError::RateLimited) => {
                    if self.max_waits.is_some_and(|max| waits >= max) {
                        return Err(FetchError::RateLimited);
                    }
                    waits += 1;
                    warn!(
                        "Too many requests! Sleeping for {} s before retrying",
                        self.backoff.as_secs_f64()
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                other => return other,
            }
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_RATE_LIMIT_BACKOFF_SECS))
    }
}
