//! Configuration structures for the directory client

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{
    DEFAULT_AUTHORITY_URL, DEFAULT_BASE_URL, DEFAULT_INVITE_REDIRECT_URL, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_SCOPE, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_SKEW_SECS,
};
use crate::errors::{DirectoryError, Result};

/// Application client secret
///
/// Redacted in `Debug`/`Display` and wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the raw secret. Only the token exchange should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Settings for one tenant/application pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: ClientSecret,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_authority_url")]
    pub authority_url: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_invite_redirect_url")]
    pub invite_redirect_url: String,
    #[serde(default = "default_true")]
    pub send_invitation_message: bool,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_token_skew_seconds")]
    pub token_skew_seconds: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl DirectoryConfig {
    /// Create a configuration with defaults for everything but credentials
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: ClientSecret::new(client_secret),
            base_url: default_base_url(),
            authority_url: default_authority_url(),
            scope: default_scope(),
            invite_redirect_url: default_invite_redirect_url(),
            send_invitation_message: true,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            token_skew_seconds: DEFAULT_TOKEN_SKEW_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the directory API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the identity provider authority (token endpoint host)
    #[must_use]
    pub fn with_authority_url(mut self, authority_url: impl Into<String>) -> Self {
        self.authority_url = authority_url.into();
        self
    }

    /// Check that credentials and limits are usable
    ///
    /// URL syntax is checked where the URLs are parsed (API client and token
    /// client), not here.
    ///
    /// # Errors
    /// Returns `DirectoryError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("tenant_id", self.tenant_id.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
            ("base_url", self.base_url.as_str()),
            ("authority_url", self.authority_url.as_str()),
            ("scope", self.scope.as_str()),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DirectoryError::config(format!("{field} must not be empty")));
            }
        }

        if self.timeout_seconds == 0 {
            return Err(DirectoryError::config("timeout_seconds must be greater than zero"));
        }

        if self.max_attempts == 0 {
            return Err(DirectoryError::config("max_attempts must be at least 1"));
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_authority_url() -> String {
    DEFAULT_AUTHORITY_URL.to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_invite_redirect_url() -> String {
    DEFAULT_INVITE_REDIRECT_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_token_skew_seconds() -> u64 {
    DEFAULT_TOKEN_SKEW_SECS
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}
