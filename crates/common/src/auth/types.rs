//! OAuth 2.0 client-credentials types
//!
//! Wire shapes for the token endpoint plus the cached credential value that
//! the [`TokenManager`](super::TokenManager) hands out.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::client::OAuthClientError;

/// Path appended to `{authority}/{tenant}/` to reach the v2 token endpoint
pub const TOKEN_ENDPOINT_PATH: &str = "oauth2/v2.0/token";

/// Secret string that is redacted in logs and wiped on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw value, for the form body only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Configuration for the client-credentials grant against one tenant
#[derive(Debug, Clone)]
pub struct ClientCredentialsConfig {
    /// Fully resolved token endpoint
    pub token_url: Url,

    /// Application (client) ID
    pub client_id: String,

    /// Application secret
    pub client_secret: SecretString,

    /// Requested scope, e.g. `https://graph.microsoft.com/.default`
    pub scope: String,

    /// Upper bound for one token request
    pub timeout: Duration,
}

impl ClientCredentialsConfig {
    /// Build the config for `{authority}/{tenant_id}/oauth2/v2.0/token`
    ///
    /// # Errors
    /// Returns `OAuthClientError::ConfigError` if the authority is not an
    /// absolute http(s) URL or the tenant is empty.
    pub fn for_tenant(
        authority: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OAuthClientError> {
        let tenant_id = tenant_id.trim().trim_matches('/');
        if tenant_id.is_empty() {
            return Err(OAuthClientError::ConfigError("tenant id must not be empty".to_string()));
        }

        let mut authority = authority.trim().to_string();
        if !authority.ends_with('/') {
            authority.push('/');
        }

        let base = Url::parse(&authority).map_err(|e| {
            OAuthClientError::ConfigError(format!("invalid authority URL '{authority}': {e}"))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(OAuthClientError::ConfigError(format!(
                "authority URL must use http or https, got '{}'",
                base.scheme()
            )));
        }

        let token_url = base
            .join(&format!("{}/{TOKEN_ENDPOINT_PATH}", urlencoding::encode(tenant_id)))
            .map_err(|e| OAuthClientError::ConfigError(format!("invalid token URL: {e}")))?;

        Ok(Self {
            token_url,
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret),
            scope: scope.into(),
            timeout,
        })
    }

    /// Form body for the client-credentials grant
    pub(crate) fn form(&self) -> [(&'static str, &str); 4] {
        [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
            ("scope", self.scope.as_str()),
        ]
    }
}

/// Token endpoint success response
///
/// `{token_type, expires_in, ext_expires_in, access_token}`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub ext_expires_in: Option<i64>,
    pub access_token: String,
}

/// OAuth error response from the authorization server (RFC 6749 §5.2)
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}

/// Bearer token plus the instant it stops being usable
///
/// Stored and replaced as one value so readers never see a token paired with
/// another token's expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedCredential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedCredential {
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { access_token: access_token.into(), expires_at }
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Valid strictly before `expires_at`
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// `Authorization` header value
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for CachedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedCredential")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
