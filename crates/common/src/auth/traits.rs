//! Traits for token acquisition
//!
//! Abstracts the token endpoint so the [`TokenManager`](super::TokenManager)
//! can be tested against mock implementations.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::TokenResponse;

/// One round-trip to an OAuth token endpoint
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Obtain a fresh token
    ///
    /// # Errors
    /// Returns error if the request fails, the endpoint rejects the
    /// credentials, or the response cannot be parsed.
    async fn exchange(&self) -> Result<TokenResponse, OAuthClientError>;
}
