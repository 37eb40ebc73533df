//! Retry utilities for the review fetcher.
//!
//! Provides exponential backoff retry logic for transient HTTP errors such as
//! 429 Rate Limited responses and retriable 5xx statuses. Non-retriable errors
//! (parse failures, 404s) are propagated immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::{FetchError, RETRIABLE_STATUSES};

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`FetchError::RateLimited`]: HTTP 429; the server has asked us to back off.
/// - [`FetchError::Http`]: network-level failure (connection reset, timeout, etc.).
/// - [`FetchError::UnexpectedStatus`] with a 500, 502, 503 or 504 status.
///
/// Non-retriable errors (propagated immediately):
/// - [`FetchError::UnexpectedStatus`] with any other status; retrying would
///   return the same result.
/// - [`FetchError::Deserialize`]: response body does not parse; retrying won't fix it.
/// - [`FetchError::Cancelled`]: the run is shutting down.
fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::RateLimited { .. } | FetchError::Http(_) => true,
        FetchError::UnexpectedStatus { status, .. } => RETRIABLE_STATUSES.contains(status),
        FetchError::Deserialize { .. } | FetchError::Cancelled { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On success the result is returned immediately.
///
/// On a retriable error the function sleeps for `backoff_base * 2^attempt`
/// and tries again, up to `max_retries` additional attempts after the first
/// try. If all retries are exhausted the last error is returned.
///
/// Non-retriable errors are returned immediately without sleeping or retrying.
///
/// # Backoff schedule (example with `backoff_base = 500ms`)
///
/// | Attempt | Sleep before next attempt |
/// |---------|--------------------------|
/// | 0 (initial) | (no sleep before first try) |
/// | 1 (first retry) | 500ms * 2^0 = 500ms |
/// | 2 (second retry) | 500ms * 2^1 = 1s |
/// | 3 (third retry) | 500ms * 2^2 = 2s |
///
/// With `max_retries = 3` the operation is attempted at most 4 times total.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        // Exponential backoff: base * 2^attempt.
        // Cap the shift to prevent overflow on extreme configs.
        let delay = backoff_base.saturating_mul(1u32 << attempt.min(31));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %last_err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
