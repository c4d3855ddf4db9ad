//! Bounded retry loop for remote store operations.

use std::future::Future;
use std::time::Duration;

use crate::config::schema::StoreRetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::store::error::StoreError;

/// Observer invoked with `(attempt, max_retries, error)` before each retry
/// sleep. Progress messaging only, never control flow.
pub type RetryObserver = Box<dyn Fn(u32, u32, &StoreError) + Send + Sync>;

/// Retries an operation on transient connectivity failures.
///
/// Guarantees at most `max_retries + 1` invocations. Non-transient errors
/// and exhaustion propagate the original error unchanged.
pub struct Retrier {
    max_retries: u32,
    base_delay_ms: u64,
    on_retry: Option<RetryObserver>,
}

impl Default for Retrier {
    fn default() -> Self {
        Self::new(3, 2000)
    }
}

impl Retrier {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            on_retry: None,
        }
    }

    pub fn from_config(config: &StoreRetryConfig) -> Self {
        Self::new(config.max_retries, config.base_delay_ms)
    }

    /// Attach a retry observer.
    pub fn with_observer(
        mut self,
        observer: impl Fn(u32, u32, &StoreError) + Send + Sync + 'static,
    ) -> Self {
        self.on_retry = Some(Box::new(observer));
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Worst-case delay added by backoff sleeps before final failure.
    pub fn worst_case_delay(&self) -> Duration {
        (1..=self.max_retries)
            .map(|attempt| calculate_backoff(attempt, self.base_delay_ms))
            .sum()
    }

    /// Run `operation`, retrying transient connectivity failures with
    /// exponential backoff. Attempts are counted from 1 for the observer
    /// and the backoff schedule.
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !error.is_connectivity() || attempt >= self.max_retries {
                        return Err(error);
                    }
                    attempt += 1;
                    if let Some(observer) = &self.on_retry {
                        observer(attempt, self.max_retries, &error);
                    }
                    let delay = calculate_backoff(attempt, self.base_delay_ms);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient store failure, retrying"
                    );
                    metrics::record_store_retry();
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
