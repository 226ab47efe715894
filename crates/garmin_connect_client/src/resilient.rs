//! Fixed-attempt call policy that substitutes a default instead of failing.

use crate::GarminError;
use std::time::Duration;

/// Error boundary for remote-call volatility. Every failure kind (timeout,
/// malformed response, missing field, rate limit) collapses to the same
/// outcome: after `max_attempts` invocations, return the caller-supplied
/// default. The error kind is still logged and counted for observability,
/// but never propagated.
#[derive(Clone, Copy, Debug)]
pub struct ResilientPolicy {
    pub max_attempts: u32,
    pub attempt_delay: Duration,
}

impl Default for ResilientPolicy {
    fn default() -> Self {
        Self::attempts(3, Duration::from_millis(500))
    }
}

impl ResilientPolicy {
    /// One attempt, no delay. Used for the single-shot catalogue calls.
    pub fn single() -> Self {
        Self {
            max_attempts: 1,
            attempt_delay: Duration::ZERO,
        }
    }

    pub fn attempts(max_attempts: u32, attempt_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt_delay,
        }
    }

    /// Invoke `f` up to `max_attempts` times with a fixed delay between
    /// attempts, returning `default` once attempts are exhausted.
    pub async fn call_or_default<F, Fut, T>(&self, operation: &str, default: T, mut f: F) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GarminError>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match f().await {
                Ok(v) => return v,
                Err(e) => {
                    metrics::counter!(
                        "garmin_remote_call_failures_total",
                        "operation" => operation.to_string()
                    )
                    .increment(1);
                    if attempt >= self.max_attempts {
                        tracing::warn!(operation, attempts = attempt, error = %e, "call failed, substituting default");
                        return default;
                    }
                    tracing::debug!(operation, attempt, error = %e, "call failed, retrying");
                    tokio::time::sleep(self.attempt_delay).await;
                }
            }
        }
    }
}
