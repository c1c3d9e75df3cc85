//! Exponential back-off retry and per-call deadline for provider calls
//!
//! Base 500ms, cap 30s, ±200ms jitter, up to 2 retries (3 attempts total).
//! Deadlines are 60s for ordinary models, 120s for reasoning-capable ones,
//! matching the two-tier timeout in the routing core's concurrency model.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::ProviderError;

const BASE: Duration = Duration::from_millis(500);
const CAP: Duration = Duration::from_secs(30);
const JITTER_MS: i64 = 200;
const MAX_RETRIES: u32 = 2;

const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);
const REASONING_DEADLINE: Duration = Duration::from_secs(120);

/// The per-call deadline a provider call is wrapped in, per the routing
/// core's timeout policy: longer for reasoning-capable models.
#[must_use]
pub const fn deadline_for(reasoning: bool) -> Duration {
    if reasoning { REASONING_DEADLINE } else { DEFAULT_DEADLINE }
}

fn backoff_for_attempt(attempt: u32) -> Duration {
    let exp = BASE.saturating_mul(2u32.saturating_pow(attempt)).min(CAP);
    let jitter = rand::rng().random_range(-JITTER_MS..=JITTER_MS);
    let millis = i64::try_from(exp.as_millis()).unwrap_or(i64::MAX) + jitter;
    Duration::from_millis(u64::try_from(millis.max(0)).unwrap_or(0))
}

/// Run `attempt_fn` up to `MAX_RETRIES` additional times while it returns a
/// retryable error, sleeping with exponential back-off between attempts.
pub async fn with_retry<T, F, Fut>(mut attempt_fn: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut last_err = None;
    for attempt in 0..=MAX_RETRIES {
        match attempt_fn().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < MAX_RETRIES => {
                let delay = backoff_for_attempt(attempt);
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "provider call failed, retrying");
                tokio::time::sleep(delay).await;
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(last_err.expect("loop always attempts at least once"))
}

/// Run `attempt_fn` through [`with_retry`], bounded by the per-step deadline
/// from [`deadline_for`]. A deadline overrun is reported as
/// [`ProviderError::Timeout`], the same as a provider-signaled timeout.
pub async fn call_with_deadline<T, F, Fut>(
    provider: &str,
    model: &str,
    reasoning: bool,
    attempt_fn: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(deadline_for(reasoning), with_retry(attempt_fn)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(ProviderError::Timeout {
            provider: provider.to_owned(),
            model: model.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, ProviderError> = with_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, ProviderError> = with_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Unavailable { provider: "x".to_owned() })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, ProviderError> = with_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Upstream {
                provider: "x".to_owned(),
                model: "y".to_owned(),
                status: 400,
                message: "bad request".to_owned(),
            })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn call_with_deadline_times_out_a_hung_attempt() {
        let result: Result<u32, ProviderError> = call_with_deadline("openai", "gpt-4o", false, || async {
            tokio::time::sleep(Duration::from_secs(61)).await;
            Ok(1)
        })
        .await;
        assert!(matches!(result, Err(ProviderError::Timeout { .. })));
    }

    #[test]
    fn reasoning_models_get_the_longer_deadline() {
        assert_eq!(deadline_for(false), Duration::from_secs(60));
        assert_eq!(deadline_for(true), Duration::from_secs(120));
    }
}
