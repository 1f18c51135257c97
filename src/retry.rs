//! Bounded retry with linear backoff.
//!
//! Shared by the Ollama client (transport attempts), the per-round lawyer
//! calls, and the judge call. Delay grows linearly with the attempt index;
//! after the budget is spent the last error is returned to the caller,
//! which decides whether it is terminal.

use std::future::Future;
use std::time::Duration;

use tracing::error;

/// Run `op` up to `attempts` times, sleeping `backoff_base * attempt_index`
/// between failures. `attempts` is clamped to at least 1.
pub async fn with_retry<T, E, F, Fut>(
    label: &str,
    attempts: u32,
    backoff_base: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                error!("{} failed (attempt {}/{}): {}", label, attempt, attempts, e);
                last_err = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(backoff_base * attempt).await;
                }
            }
        }
    }
    // The loop ran at least once, so an error was recorded.
    Err(last_err.expect("retry loop recorded an error"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const FAST: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_first_attempt_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry("op", 3, FAST, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(7) }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry("op", 3, FAST, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(format!("transient {}", n))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry("op", 3, FAST, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("failure {}", n)) }
        })
        .await;
        assert_eq!(result.unwrap_err(), "failure 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_clamped_to_one() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry("op", 0, FAST, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
