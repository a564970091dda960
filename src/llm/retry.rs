//! Retry manager with exponential backoff
//!
//! Bounded retry for transport failures of the classification service.
//! Only transport errors are retried; everything else returns at once.

use crate::errors::{DispatchError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Default attempts: the first call plus one retry
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Base delay for exponential backoff (250 ms)
const BASE_DELAY_MS: u64 = 250;

/// Maximum delay cap (4 seconds)
const MAX_DELAY_MS: u64 = 4000;

/// Retry manager with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryManager {
    /// Maximum attempts, including the first
    max_attempts: u32,

    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum delay cap in milliseconds
    max_delay_ms: u64,

    /// Enable jitter
    enable_jitter: bool,
}

impl Default for RetryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryManager {
    /// Create new retry manager with default settings
    pub fn new() -> Self {
        Self::with_config(DEFAULT_MAX_ATTEMPTS, BASE_DELAY_MS)
    }

    /// Create retry manager with custom settings
    pub fn with_config(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms: MAX_DELAY_MS,
            enable_jitter: true,
        }
    }

    /// Execute operation with retry logic
    ///
    /// The last transport error is returned once attempts are exhausted.
    pub async fn execute_with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !self.is_retryable(&e) {
                        return Err(e);
                    }

                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(e);
                    }

                    let delay = self.calculate_delay(attempt - 1);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Calculate delay for given retry number (0-based)
    fn calculate_delay(&self, retry: u32) -> Duration {
        let exponential_delay = self.base_delay_ms.saturating_mul(2u64.saturating_pow(retry));
        let delay_ms = exponential_delay.min(self.max_delay_ms);

        // ±25% random variation
        let final_delay = if self.enable_jitter {
            let jitter = (delay_ms / 4) as i64;
            let random_jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter as f64;
            ((delay_ms as i64) + random_jitter as i64).max(0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }

    /// Transport failures are retried; an exhausted classifier is final
    fn is_retryable(&self, error: &DispatchError) -> bool {
        error.is_transport() && !matches!(error, DispatchError::ClassifierUnavailable(_))
    }

    /// Get max attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
