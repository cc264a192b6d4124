use crate::error::SyncError;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff for flaky store calls.
///
/// The audit and repair paths treat the vector index as eventually available:
/// transient failures are retried with doubling delays, and only after
/// `max_attempts` does the error surface as [`SyncError::Unavailable`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(16),
        }
    }
}

impl RetryPolicy {
    pub async fn run<T, F, Fut>(&self, backend: &str, mut operation: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let mut delay = self.initial_delay;
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    tracing::warn!(backend, attempt, %error, "retryable call failed");
                    last_error = error.to_string();
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(self.max_delay);
            }
        }

        Err(SyncError::Unavailable {
            backend: backend.to_string(),
            attempts: self.max_attempts,
            detail: last_error,
        })
    }
}
