//! Authenticated directory API client
//!
//! Resolves relative paths against a normalized base URL, attaches a bearer
//! credential, decodes the JSON response and classifies failures into
//! [`DirectoryError`].

use std::sync::Arc;
use std::time::Duration;

use guestdir_domain::constants::{DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS};
use guestdir_domain::{DirectoryConfig, DirectoryError};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::AccessTokenProvider;
use crate::errors::InfraError;
use crate::http::HttpClient;

const USER_AGENT: &str = concat!("guestdir/", env!("CARGO_PKG_VERSION"));

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the directory API (e.g. "https://graph.microsoft.com/v1.0")
    pub base_url: String,
    /// Timeout for one API request
    pub timeout: Duration,
    /// Total attempts per request; values above 1 retry transport failures
    pub max_attempts: usize,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<&DirectoryConfig> for ApiClientConfig {
    fn from(config: &DirectoryConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            max_attempts: config.max_attempts,
        }
    }
}

/// Directory API client
pub struct ApiClient {
    http_client: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Config` if the base URL is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(
        config: ApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, DirectoryError> {
        let base_url = normalize_base_url(&config.base_url)?;

        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .build()?;

        Ok(Self { http_client, auth, base_url })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Normalized base URL (always ends with `/`)
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a relative path against the base URL
    ///
    /// Leading `/` characters are ignored so `"/users/1"` and `"users/1"`
    /// resolve to the same URL. Query strings are preserved. Absolute URLs
    /// (e.g. `@odata.nextLink`) are accepted only on the base URL's origin.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Config` if the path cannot be joined or points
    /// at another origin.
    pub fn resolve(&self, path: &str) -> Result<Url, DirectoryError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DirectoryError::from(InfraError::from(e)))?;

        if url.origin() != self.base_url.origin() {
            return Err(DirectoryError::config(format!(
                "refusing to send credentials to {}",
                url.origin().ascii_serialization()
            )));
        }

        Ok(url)
    }

    /// Perform an authenticated request and decode the JSON response
    ///
    /// The body is decoded into `T` whatever the status; an empty body decodes
    /// as JSON `null`. A decode failure wins over the status and keeps it.
    ///
    /// # Errors
    ///
    /// - `Config` if the path cannot be resolved
    /// - `Authentication` if no credential could be obtained
    /// - `Transport` if no response was received
    /// - `Decode` if the body does not match `T`
    /// - `Api` if the body decoded but the status is not 2xx
    pub async fn perform_request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, DirectoryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(method, path, body, |_: &T| Ok(())).await
    }

    #[instrument(skip_all, fields(method = %method, path = %path))]
    async fn execute<B, T, V>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        validate: V,
    ) -> Result<T, DirectoryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        V: FnOnce(&T) -> Result<(), String> + Send,
    {
        let url = self.resolve(path)?;
        let authorization = self.auth.ensure_credential().await?;

        debug!(url = %url, "sending directory request");

        let mut request = self
            .http_client
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, authorization);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.http_client.send(request).await?;
        let status = response.status();
        let bytes =
            response.bytes().await.map_err(|e| DirectoryError::from(InfraError::from(e)))?;

        let result = decode_validated(status, &bytes, validate);
        match &result {
            Ok(_) => debug!(status = status.as_u16(), "directory request succeeded"),
            Err(e) => warn!(status = status.as_u16(), error = %e, "directory request failed"),
        }
        result
    }

    /// [`perform_request`](Self::perform_request) that stops when `cancel`
    /// fires
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Transport` ("request cancelled") on
    /// cancellation, otherwise as [`perform_request`](Self::perform_request).
    pub async fn perform_request_with_cancel<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<T, DirectoryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(path = %path, "directory request cancelled");
                Err(DirectoryError::transport("request cancelled"))
            }
            result = self.perform_request(method, path, body) => result,
        }
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// See [`perform_request`](Self::perform_request).
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DirectoryError> {
        self.perform_request::<(), T>(Method::GET, path, None).await
    }

    /// Execute a GET request and check the decoded success value
    ///
    /// `validate` runs only on a 2xx response; its error message becomes a
    /// `Decode` error carrying the real status and body.
    ///
    /// # Errors
    ///
    /// See [`perform_request`](Self::perform_request).
    pub async fn get_validated<T, V>(&self, path: &str, validate: V) -> Result<T, DirectoryError>
    where
        T: DeserializeOwned,
        V: FnOnce(&T) -> Result<(), String> + Send,
    {
        self.execute::<(), T, V>(Method::GET, path, None, validate).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`perform_request`](Self::perform_request).
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DirectoryError> {
        self.perform_request(Method::POST, path, Some(body)).await
    }

    /// Execute a DELETE request, accepting any JSON or empty body
    ///
    /// # Errors
    ///
    /// See [`perform_request`](Self::perform_request).
    pub async fn delete(&self, path: &str) -> Result<(), DirectoryError> {
        self.perform_request::<(), IgnoredAny>(Method::DELETE, path, None).await.map(|_| ())
    }
}

/// Append the trailing `/` that `Url::join` needs and validate the scheme
fn normalize_base_url(raw: &str) -> Result<Url, DirectoryError> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    let url = Url::parse(&base)
        .map_err(|e| DirectoryError::config(format!("invalid base URL '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(DirectoryError::config(format!(
            "base URL must be an absolute http(s) URL, got '{raw}'"
        )));
    }

    Ok(url)
}

#[cfg(test)]
fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    bytes: &[u8],
) -> Result<T, DirectoryError> {
    decode_validated(status, bytes, |_: &T| Ok(()))
}

fn decode_validated<T, V>(
    status: StatusCode,
    bytes: &[u8],
    validate: V,
) -> Result<T, DirectoryError>
where
    T: DeserializeOwned,
    V: FnOnce(&T) -> Result<(), String>,
{
    let text = String::from_utf8_lossy(bytes);

    let decoded = if text.trim().is_empty() {
        serde_json::from_value::<T>(serde_json::Value::Null)
    } else {
        serde_json::from_slice::<T>(bytes)
    };

    match decoded {
        Err(e) => Err(DirectoryError::decode(status.as_u16(), e.to_string(), &text)),
        Ok(value) if status.is_success() => match validate(&value) {
            Ok(()) => Ok(value),
            Err(message) => Err(DirectoryError::decode(status.as_u16(), message, &text)),
        },
        Ok(_) => Err(DirectoryError::api(status.as_u16(), text.into_owned())),
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the authentication provider
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<ApiClient, DirectoryError> {
        let config = self.config.unwrap_or_default();
        let auth = self.auth.ok_or_else(|| DirectoryError::config("Auth provider not set"))?;

        ApiClient::new(config, auth)
    }
}
