use crate::config::Config;
use crate::core::{AuditError, AuditResult};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

const USER_AGENT: &str = concat!("lockaudit/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client with the configured request timeout
pub fn build_client(config: &Config) -> AuditResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .build()
        .map_err(AuditError::Http)
}

/// Send a request, retrying connect/timeout failures and 429/5xx answers
/// up to `max_retries` times with exponential backoff.
///
/// The final response is returned as-is, whatever its status; callers map
/// statuses to errors themselves.
pub async fn send_with_retry(request: RequestBuilder, max_retries: u32) -> AuditResult<Response> {
    let mut attempt = 0;
    loop {
        let current = request
            .try_clone()
            .ok_or_else(|| AuditError::Source("request cannot be retried".to_string()))?;

        match current.send().await {
            Ok(response) if is_retryable_status(response.status()) && attempt < max_retries => {
                warn!(
                    status = %response.status(),
                    url = %response.url(),
                    attempt = attempt + 1,
                    "transient HTTP status, retrying"
                );
            }
            Ok(response) => return Ok(response),
            Err(e) => {
                let err = AuditError::Http(e);
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                warn!(error = %err, attempt = attempt + 1, "request failed, retrying");
            }
        }

        tokio::time::sleep(backoff(attempt)).await;
        attempt += 1;
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(250 * 2u64.pow(attempt.min(6)))
}
