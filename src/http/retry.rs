//! Bounded retry around a single logical fetch
//!
//! Both the initial listing request and every cursor fetch go through
//! [`fetch_page`]; reaction batches use [`with_retries`] directly. A response
//! carrying the remote error indicator counts as a failed attempt, as do
//! transient transport failures; either kind consumes the shared budget.
//! Running out of budget fails the whole operation with the last remote
//! message, it never degrades to a partial result.

use std::future::Future;

use tracing::warn;

use super::Transport;
use crate::config::RetryPolicy;
use crate::decode::PagePayload;
use crate::error::{Error, Result};

/// Retry an operation with a fixed backoff until the budget runs out.
///
/// Non-retryable errors propagate immediately; exhaustion surfaces the last
/// remote message verbatim.
pub async fn with_retries<F, T, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => e,
            Err(e) => return Err(e),
        };

        if attempt >= max_attempts {
            return Err(Error::retries_exhausted(
                max_attempts,
                error.remote_message(),
            ));
        }

        warn!(
            "Fetch failed: {}, attempt {}/{}, retrying in {:?}",
            error, attempt, max_attempts, policy.backoff
        );
        tokio::time::sleep(policy.backoff).await;
        attempt += 1;
    }
}

/// Fetch one listing page, retrying on remote errors
pub async fn fetch_page(
    transport: &Transport,
    url: &str,
    policy: &RetryPolicy,
) -> Result<PagePayload> {
    with_retries(policy, || async {
        let mut payload = transport.invoke(url).await?;
        if let Some(indicator) = payload.error.take() {
            return Err(indicator.into_error());
        }
        Ok(payload)
    })
    .await
}
