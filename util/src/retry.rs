use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Bounded retry with exponential backoff.
/// `attempts == 1` means a single try without retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::no_retries()
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self { attempts: attempts.max(1), initial_backoff, max_backoff }
    }

    pub fn no_retries() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs `op` until it succeeds, the error is not retryable, or attempts are exhausted.
    /// The last error is returned as is.
    pub async fn run<T, E, F, Fut>(&self, op_name: &str, mut op: F, is_retryable: impl Fn(&E) -> bool) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if attempt < self.attempts && is_retryable(&e) => {
                    debug!("'{op_name}' attempt {attempt}/{} failed: {e}. Retrying in {backoff:?}.", self.attempts);
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.max_backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
