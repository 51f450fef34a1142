//! Credential cache with single-flight refresh
//!
//! Holds at most one bearer credential per tenant/application pair:
//! - Serves the cached token while it is strictly before its expiry
//! - Exchanges client credentials when the cache is empty or stale
//! - Lets only one caller refresh at a time; the others re-read the cache
//! - Leaves the cache untouched when an exchange fails

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::client::OAuthClientError;
use super::traits::TokenExchange;
use super::types::{CachedCredential, TokenResponse};
use crate::time::{Clock, SystemClock};

/// Error type for token manager operations
#[derive(Debug, thiserror::Error)]
pub enum TokenManagerError {
    /// Token endpoint call failed
    #[error("token exchange failed: {0}")]
    Exchange(#[from] OAuthClientError),

    /// Token endpoint granted a lifetime that is not positive or cannot be
    /// represented as an expiry instant
    #[error("token endpoint returned unusable expires_in ({0})")]
    InvalidLifetime(i64),

    /// Token endpoint returned an empty access token
    #[error("token endpoint returned an empty access token")]
    EmptyToken,
}

/// Client-credentials token cache
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct TokenManager<E: TokenExchange, C: Clock = SystemClock> {
    exchange: E,
    clock: C,
    skew: chrono::Duration,
    current: RwLock<Option<CachedCredential>>,
    refresh_gate: Mutex<()>,
}

impl<E: TokenExchange> TokenManager<E, SystemClock> {
    /// Create a token manager on the system clock
    ///
    /// # Arguments
    /// * `exchange` - Token endpoint client
    /// * `skew` - Subtracted from each token's lifetime so it is refreshed
    ///   before the server considers it expired
    #[must_use]
    pub fn new(exchange: E, skew: Duration) -> Self {
        Self::with_clock(exchange, SystemClock, skew)
    }
}

impl<E: TokenExchange, C: Clock> TokenManager<E, C> {
    /// Create a token manager with an injected clock
    #[must_use]
    pub fn with_clock(exchange: E, clock: C, skew: Duration) -> Self {
        let skew = chrono::Duration::from_std(skew).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            exchange,
            clock,
            skew,
            current: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Return `"Bearer <token>"`, exchanging credentials first if needed
    ///
    /// # Errors
    /// Returns error if a token exchange was needed and failed. The cached
    /// credential is left as it was.
    pub async fn ensure_credential(&self) -> Result<String, TokenManagerError> {
        Ok(self.valid_credential().await?.bearer())
    }

    /// Return the raw access token, exchanging credentials first if needed
    ///
    /// # Errors
    /// Same as [`ensure_credential`](Self::ensure_credential).
    pub async fn access_token(&self) -> Result<String, TokenManagerError> {
        Ok(self.valid_credential().await?.access_token().to_string())
    }

    async fn valid_credential(&self) -> Result<CachedCredential, TokenManagerError> {
        if let Some(credential) = self.cached_if_valid().await {
            return Ok(credential);
        }

        let _gate = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited for the gate
        if let Some(credential) = self.cached_if_valid().await {
            debug!("credential refreshed by concurrent caller");
            return Ok(credential);
        }

        self.exchange_and_store().await
    }

    /// Exchange credentials now, regardless of the cached value
    ///
    /// # Errors
    /// Returns error if the exchange fails; the cache is not modified.
    pub async fn refresh(&self) -> Result<CachedCredential, TokenManagerError> {
        let _gate = self.refresh_gate.lock().await;
        self.exchange_and_store().await
    }

    #[instrument(skip(self))]
    async fn exchange_and_store(&self) -> Result<CachedCredential, TokenManagerError> {
        let response = match self.exchange.exchange().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token exchange failed; keeping cached credential");
                return Err(e.into());
            }
        };

        let credential = self.credential_from(&response)?;
        *self.current.write().await = Some(credential.clone());

        info!(expires_at = %credential.expires_at(), "acquired access token");
        Ok(credential)
    }

    fn credential_from(
        &self,
        response: &TokenResponse,
    ) -> Result<CachedCredential, TokenManagerError> {
        if response.expires_in <= 0 {
            return Err(TokenManagerError::InvalidLifetime(response.expires_in));
        }
        if response.access_token.is_empty() {
            return Err(TokenManagerError::EmptyToken);
        }

        let invalid = || TokenManagerError::InvalidLifetime(response.expires_in);
        let lifetime = chrono::Duration::try_seconds(response.expires_in).ok_or_else(invalid)?;
        let effective = if lifetime > self.skew { lifetime - self.skew } else { lifetime };
        let expires_at = self.clock.now().checked_add_signed(effective).ok_or_else(invalid)?;

        Ok(CachedCredential::new(response.access_token.clone(), expires_at))
    }

    async fn cached_if_valid(&self) -> Option<CachedCredential> {
        let now = self.clock.now();
        self.current.read().await.as_ref().filter(|c| c.is_valid_at(now)).cloned()
    }

    /// Current cached credential, valid or not, without refreshing
    pub async fn cached(&self) -> Option<CachedCredential> {
        self.current.read().await.clone()
    }

    /// Replace the cached credential
    pub async fn store_credential(&self, credential: CachedCredential) {
        *self.current.write().await = Some(credential);
    }

    /// Drop the cached credential so the next call exchanges again
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
        debug!("credential cache invalidated");
    }

    /// Seconds until the cached credential expires, if one is cached
    pub async fn seconds_until_expiry(&self) -> Option<i64> {
        let now: DateTime<Utc> = self.clock.now();
        self.current.read().await.as_ref().map(|c| (c.expires_at() - now).num_seconds())
    }
}
