//! Retry with exponential back-off and jitter for the chat-completion call.
//!
//! Only transient failures are retried: connection and timeout errors,
//! `429 Too Many Requests`, and 5xx responses. Client errors such as a bad
//! API key come back on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::InsightError;

/// Returns `true` for errors worth another attempt after a back-off delay.
pub(crate) fn is_retriable(err: &InsightError) -> bool {
    match err {
        InsightError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        InsightError::Status { status, .. } => *status == 429 || (500..600).contains(status),
        InsightError::Malformed(_) => false,
    }
}

/// Ceiling for a single back-off sleep.
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Sleep before retry number `retry` (1-based): `base_ms * 2^(retry-1)`
/// capped at [`MAX_DELAY`], then scaled by `jitter` (expected in `0.75..1.25`).
fn backoff_delay(retry: u32, base_ms: u64, jitter: f64) -> Duration {
    let doubled = base_ms.saturating_mul(1u64 << retry.saturating_sub(1).min(10));
    let capped = Duration::from_millis(doubled).min(MAX_DELAY);
    capped.mul_f64(jitter)
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
///
/// With the default insight settings (`COMMENTSCOPE_INSIGHT_MAX_RETRIES=2`,
/// `COMMENTSCOPE_INSIGHT_BACKOFF_BASE_MS=1000`) a persistently failing
/// endpoint is hit three times, sleeping roughly 1 s and then 2 s in between.
/// Every sleep carries ±25 % jitter. The last error is returned unchanged.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, InsightError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, InsightError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retry += 1;
        let delay = backoff_delay(retry, backoff_base_ms, rand::random::<f64>() * 0.5 + 0.75);
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "insight request failed, retrying after back-off"
        );
        tokio::time::sleep(delay).await;
    }
}
