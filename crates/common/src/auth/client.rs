//! OAuth 2.0 client-credentials client
//!
//! Posts the application's id and secret to the tenant's token endpoint and
//! returns the raw [`TokenResponse`]. Lifetime handling and caching live in
//! the [`TokenManager`](super::TokenManager).

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::traits::TokenExchange;
use super::types::{ClientCredentialsConfig, OAuthError, TokenResponse};

/// Error type for token endpoint calls
#[derive(Debug, thiserror::Error)]
pub enum OAuthClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Token endpoint returned a structured OAuth error
    #[error("OAuth error (status {status}): {error}")]
    OAuthError { status: u16, error: OAuthError },

    /// Token endpoint returned a non-success status without an OAuth error body
    #[error("unexpected token endpoint status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Failed to parse a success response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Client-credentials grant client
#[derive(Debug, Clone)]
pub struct ClientCredentialsClient {
    config: ClientCredentialsConfig,
    client: Client,
}

impl ClientCredentialsClient {
    /// Create a client with its own connection pool
    ///
    /// # Errors
    /// Returns `OAuthClientError::ConfigError` if the HTTP client cannot be
    /// built.
    pub fn new(config: ClientCredentialsConfig) -> Result<Self, OAuthClientError> {
        let client = Client::builder().timeout(config.timeout).build().map_err(|e| {
            OAuthClientError::ConfigError(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self { config, client })
    }

    /// Create a client that shares an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(config: ClientCredentialsConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Token endpoint this client posts to
    #[must_use]
    pub fn token_url(&self) -> &url::Url {
        &self.config.token_url
    }

    /// Perform one client-credentials exchange
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or an
    /// undecodable body.
    #[instrument(skip(self), fields(token_url = %self.config.token_url))]
    pub async fn request_token(&self) -> Result<TokenResponse, OAuthClientError> {
        debug!("requesting client-credentials token");

        let response = self
            .client
            .post(self.config.token_url.clone())
            .timeout(self.config.timeout)
            .form(&self.config.form())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "token endpoint rejected request");
            return Err(match serde_json::from_str::<OAuthError>(&body) {
                Ok(error) => OAuthClientError::OAuthError { status: status.as_u16(), error },
                Err(_) => OAuthClientError::UnexpectedStatus { status: status.as_u16(), body },
            });
        }

        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|e| OAuthClientError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TokenExchange for ClientCredentialsClient {
    async fn exchange(&self) -> Result<TokenResponse, OAuthClientError> {
        self.request_token().await
    }
}
