//! Retry Wrapper: bounded retries of one engine on transient failures.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::EngineError;

/// Linear backoff policy: after failed attempt `n`, wait `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Permanent errors return at once. On exhaustion the last transient
    /// error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, EngineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = self.base_delay * attempt;
                    warn!("{label}: attempt {attempt}/{attempts} failed ({e}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Run `op` under the default policy (2 attempts, 0.5 s linear backoff).
pub async fn with_retry<T, F, Fut>(label: &str, op: F) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    RetryPolicy::default().run(label, op).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant() -> RetryPolicy {
        RetryPolicy::new(2, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_transient_once_then_success() {
        let calls = AtomicU32::new(0);
        let result = instant()
            .run("test", || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(EngineError::Transient("timeout".into()))
                } else {
                    Ok("ok")
                }
            })
            .await;
        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = instant()
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EngineError::Permanent("bad key".into()))
            })
            .await;
        assert_eq!(result, Err(EngineError::Permanent("bad key".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_transient() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::new(3, Duration::ZERO)
            .run("test", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(EngineError::Transient(format!("reset {n}")))
            })
            .await;
        assert_eq!(result, Err(EngineError::Transient("reset 2".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_calls_once() {
        let calls = AtomicU32::new(0);
        let _: Result<(), _> = RetryPolicy::new(0, Duration::ZERO)
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EngineError::Transient("x".into()))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_backoff_is_linear() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let _: Result<(), _> = with_retry("test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(EngineError::Transient("x".into()))
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
