//! Bounded exponential-backoff retries around store calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cv_core::StoreResult;
use tracing::{debug, warn};

use crate::connection::ConnectionMonitor;

/// Backoff parameters for [`RetryExecutor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry, doubled for each later one.
    pub base_delay: Duration,
    /// Upper bound for a single wait.
    pub max_backoff: Duration,
    /// Upper bound of the random jitter added to each wait.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(2_000),
            max_backoff: Duration::from_millis(30_000),
            max_jitter: Duration::from_millis(1_000),
        }
    }
}

impl RetryPolicy {
    /// Wait after the zero-based `attempt` failed, given a jitter already drawn.
    pub fn delay_for(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .saturating_mul(factor)
            .saturating_add(jitter)
            .min(self.max_backoff)
    }

    fn draw_jitter(&self) -> Duration {
        let max = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(fastrand::u64(0..=max))
    }
}

/// Runs a store operation with retries, reporting connectivity failures to the monitor.
#[derive(Clone, Debug)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    monitor: Arc<ConnectionMonitor>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, monitor: Arc<ConnectionMonitor>) -> Self {
        Self { policy, monitor }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` with the policy's attempt budget.
    pub async fn run<T, F, Fut>(&self, operation: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        self.run_with_attempts(self.policy.max_attempts, operation)
            .await
    }

    /// Run `operation` up to `max_attempts` times.
    ///
    /// The last failure is returned unchanged. Connectivity failures switch the
    /// monitor offline before the backoff wait, and the next attempt switches it
    /// back online first. Exhausting the budget on a connectivity failure leaves
    /// the monitor offline.
    pub async fn run_with_attempts<T, F, Fut>(
        &self,
        max_attempts: u32,
        mut operation: F,
    ) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    self.monitor.record_success();
                    return Ok(value);
                }
                Err(err) => {
                    self.monitor.record_failure();
                    if err.is_connectivity() {
                        self.monitor.go_offline().await;
                    }
                    if attempt + 1 >= max_attempts {
                        debug!(attempt, error = %err, "retry: attempts exhausted");
                        return Err(err);
                    }
                    let delay = self.policy.delay_for(attempt, self.policy.draw_jitter());
                    warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retry: store call failed, backing off"
                    );
                    self.monitor.record_retry();
                    tokio::time::sleep(delay).await;
                    if self.monitor.is_offline() {
                        self.monitor.go_online().await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
