use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::rchain::provider::{AskOptions, ProviderError};

const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Transport policy for one chat-completions POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub timeout: Option<Duration>,
    pub retries: u32,
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_options(options: &AskOptions) -> Self {
        Self {
            timeout: options.timeout_secs.map(Duration::from_secs),
            retries: options.retries,
            base_delay_ms: options.retry_delay_ms,
        }
    }

    fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Backoff before retry number `attempt + 1`; doubles each time, capped.
    fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(MAX_RETRY_DELAY_MS);
        Duration::from_millis(delay_ms)
    }
}

pub(crate) async fn post_json_with_retry<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    payload: &T,
    policy: RetryPolicy,
) -> Result<reqwest::Response, ProviderError> {
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        let mut request = client.post(url).bearer_auth(api_key).json(payload);
        if let Some(timeout) = policy.timeout {
            request = request.timeout(timeout);
        }

        debug!(url, attempt, "sending chat completion request");
        let retryable = match request.send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if !is_retryable_status(status) || attempt + 1 >= max_attempts {
                    return Err(ProviderError::Api { status, body });
                }
                format!("status {status}")
            }
            Err(source) => {
                if !is_retryable_request_error(&source) || attempt + 1 >= max_attempts {
                    return Err(ProviderError::Request(source));
                }
                source.to_string()
            }
        };

        let delay = policy.delay(attempt);
        warn!(
            attempt = attempt + 1,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            reason = %retryable,
            "retrying chat completion request"
        );
        sleep(delay).await;
        attempt += 1;
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_request_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
