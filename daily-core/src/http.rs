//! Shared HTTP client with a bounded timeout and transport-level retries.
//!
//! Retries cover transient failures only:
//! - timeouts and connection errors
//! - HTTP 429, 500, 502, 503, 504
//!
//! Everything else (4xx, malformed bodies, provider error codes) is returned
//! to the caller on the first attempt.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

/// Upper bound for a single request attempt.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 4000;

/// Exponential backoff settings.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt (doubles each time).
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Delay to wait after the `retry`-th failed attempt (0-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry);
        let delay_ms = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay.as_millis() as u64))
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// `reqwest::Client` plus the retry policy applied by [`HttpClient::send`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Build a client with [`REQUEST_TIMEOUT`] applied to every request.
    pub fn new(retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("daily-push/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, retry })
    }

    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send the request produced by `build`, rebuilding it for each retry.
    ///
    /// Once attempts run out the last response is returned as-is, even when
    /// its status is retryable, so callers can report it.
    pub async fn send<F>(&self, build: F) -> reqwest::Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let last = attempt >= self.retry.max_attempts;

            match build(&self.client).send().await {
                Ok(response) => {
                    let status = response.status();
                    if last || !is_retryable_status(status) {
                        if attempt > 1 {
                            debug!(attempt, %status, "request finished after retries");
                        }
                        return Ok(response);
                    }
                    warn!(attempt, max = self.retry.max_attempts, %status, "retryable status");
                }
                Err(err) => {
                    if last || !is_retryable_error(&err) {
                        return Err(err);
                    }
                    warn!(attempt, max = self.retry.max_attempts, error = %err, "retryable error");
                }
            }

            tokio::time::sleep(self.retry.delay_for_retry(attempt - 1)).await;
        }
    }
}

/// Shorten a response body for log and error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client(max_attempts: u32) -> HttpClient {
        HttpClient::new(RetryPolicy::new(max_attempts, 1, 5)).unwrap()
    }

    #[test]
    fn default_policy_matches_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_millis(4000));
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 100, 1000);
        assert_eq!(policy.delay_for_retry(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_retry(4), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_retry(40), Duration::from_millis(1000));
    }

    #[test]
    fn only_transient_statuses_are_retryable() {
        for status in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(StatusCode::from_u16(status).unwrap()));
        }
        for status in [200, 400, 401, 403, 404, 501] {
            assert!(!is_retryable_status(StatusCode::from_u16(status).unwrap()));
        }
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "晴".repeat(300);
        let short = truncate_body(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 203);
        assert_eq!(truncate_body("ok"), "ok");
    }

    #[tokio::test]
    async fn retries_transient_status_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
            .expect(1)
            .mount(&server)
            .await;

        let http = fast_client(3);
        let url = format!("{}/flaky", server.uri());
        let response = http.send(|c| c.get(&url)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "fine");
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;

        let http = fast_client(3);
        let url = server.uri();
        let response = http.send(|c| c.get(&url)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn timeouts_are_retried_up_to_the_cap() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(3)
            .mount(&server)
            .await;

        let client = Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let http = HttpClient::with_client(client, RetryPolicy::new(3, 1, 5));
        let url = server.uri();
        let err = http.send(|c| c.get(&url)).await.unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let http = fast_client(3);
        let url = server.uri();
        let response = http.send(|c| c.get(&url)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
