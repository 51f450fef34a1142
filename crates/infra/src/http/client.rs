use std::time::Duration;

use guestdir_domain::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS};
use guestdir_domain::DirectoryError;
use rand::Rng;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// HTTP client with a per-request timeout and bounded transport retry.
///
/// Only failures that never produced a response are retried. Any HTTP
/// status, including 5xx, is returned to the caller as-is.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, DirectoryError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Total attempts per request (initial try + retries).
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Execute the provided request builder with retry semantics.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, DirectoryError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                DirectoryError::config(
                    "request body cannot be cloned; buffer the body to enable retries",
                )
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                DirectoryError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");
                    return Ok(response);
                }
                Err(err) => {
                    if attempt + 1 < attempts && should_retry_error(&err) {
                        warn!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed; retrying");
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");
                    let infra: InfraError = err.into();
                    return Err(DirectoryError::from(infra));
                }
            }
        }

        Err(DirectoryError::transport("http client exhausted retries without producing a result"))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        let delay = self.base_backoff.saturating_mul(multiplier);

        // Up to 50% extra so concurrent callers do not retry in lockstep
        let jitter_cap = u64::try_from(delay.as_millis() / 2).unwrap_or(u64::MAX);
        if jitter_cap == 0 {
            return delay;
        }
        let jitter = rand::thread_rng().gen_range(0..=jitter_cap);
        delay.saturating_add(Duration::from_millis(jitter))
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, DirectoryError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            DirectoryError::config(format!("failed to build HTTP client: {err}"))
        })?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_request() {
        return true;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}
