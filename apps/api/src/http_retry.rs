//! Outbound HTTP with retry on 429 and 5xx, shared by the embedding and LLM clients.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
const BASE_DELAY_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum RetryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gave up after {retries} attempts")]
    Exhausted { retries: u32 },
}

/// Exponential backoff before retry `attempt` (1-based): 1s, 2s, 4s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(6);
    Duration::from_millis(BASE_DELAY_MS << shift)
}

/// Sends the request produced by `build` until it succeeds or `max_retries` attempts are spent.
///
/// Transport errors, 429 and 5xx are retried. Any other non-success status is returned
/// immediately as `RetryError::Api` with the raw response body.
pub async fn send_with_retry<F>(
    label: &str,
    max_retries: u32,
    mut build: F,
) -> Result<Response, RetryError>
where
    F: FnMut() -> RequestBuilder,
{
    let mut last_error: Option<RetryError> = None;

    for attempt in 0..max_retries {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            warn!(
                "{label} attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(RetryError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{label} returned {status}: {body}");
            last_error = Some(RetryError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetryError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        return Ok(response);
    }

    Err(last_error.unwrap_or(RetryError::Exhausted {
        retries: max_retries,
    }))
}
