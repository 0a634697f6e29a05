//! Retry policy for Slack calls.
//!
//! Rate limits are waited out for as long as it takes. Transient failures
//! get a small budget per request; once it is spent the caller is told to
//! give up quietly. Anything else is returned as an error immediately.

use std::future::Future;
use std::time::Duration;

use opentelemetry::KeyValue;

use crate::error::{ApiError, Result};
use crate::telemetry::metrics;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Added on top of Slack's `Retry-After`.
    pub rate_limit_padding: Duration,
    /// Pause between transient failures.
    pub transient_delay: Duration,
    /// Transient failures tolerated per request before giving up.
    pub transient_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_padding: Duration::from_secs(2),
            transient_delay: Duration::from_secs(3),
            transient_attempts: 3,
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, returns a fatal error, or exhausts the
    /// transient budget.
    ///
    /// Returns `Ok(None)` when the budget ran out. Rate-limit retries do not
    /// count against the budget, and each call starts with a fresh one.
    pub async fn call<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, ApiError>>,
    {
        let mut transient_failures = 0u32;

        loop {
            match op().await {
                Ok(value) => return Ok(Some(value)),
                Err(ApiError::RateLimited { retry_after }) => {
                    let wait = retry_after + self.rate_limit_padding;
                    tracing::warn!(
                        operation,
                        wait_secs = wait.as_secs(),
                        "rate limited, waiting"
                    );
                    record_retry(operation, "rate_limited");
                    tokio::time::sleep(wait).await;
                }
                Err(ApiError::Transient(reason)) => {
                    transient_failures += 1;
                    if transient_failures >= self.transient_attempts {
                        tracing::warn!(
                            operation,
                            attempts = transient_failures,
                            %reason,
                            "giving up after repeated transient errors"
                        );
                        record_retry(operation, "exhausted");
                        return Ok(None);
                    }
                    tracing::warn!(
                        operation,
                        attempt = transient_failures,
                        %reason,
                        "transient error, retrying"
                    );
                    record_retry(operation, "transient");
                    tokio::time::sleep(self.transient_delay).await;
                }
                Err(fatal @ ApiError::Fatal(_)) => {
                    tracing::error!(operation, error = %fatal, "unrecoverable slack error");
                    return Err(fatal.into());
                }
            }
        }
    }
}

fn record_retry(operation: &str, kind: &'static str) {
    metrics::api_retries().add(
        1,
        &[
            KeyValue::new("operation", operation.to_string()),
            KeyValue::new("kind", kind),
        ],
    );
}
