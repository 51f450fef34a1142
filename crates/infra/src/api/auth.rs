//! Directory API authentication
//!
//! Bridges the client-credentials [`TokenManager`] into the API client. The
//! manager is owned behind an `Arc` so one credential cache can serve every
//! client built for the same tenant/application pair.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use guestdir_common::auth::{
    ClientCredentialsClient, ClientCredentialsConfig, TokenExchange, TokenManager,
};
use guestdir_common::time::{Clock, SystemClock};
use guestdir_domain::{DirectoryConfig, DirectoryError};
use tracing::debug;

use crate::errors::InfraError;

/// Trait for providing `Authorization` header values
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Return `"Bearer <token>"`, refreshing the credential if needed
    async fn ensure_credential(&self) -> Result<String, DirectoryError>;
}

/// Client-credentials authentication for one tenant/application pair
pub struct DirectoryAuthService<E = ClientCredentialsClient, C = SystemClock>
where
    E: TokenExchange,
    C: Clock,
{
    tokens: Arc<TokenManager<E, C>>,
}

impl DirectoryAuthService {
    /// Build the token endpoint client and credential cache from config
    ///
    /// # Errors
    /// Returns `DirectoryError::Config` if the authority URL or tenant is
    /// unusable or the HTTP client cannot be built.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let credentials = ClientCredentialsConfig::for_tenant(
            &config.authority_url,
            &config.tenant_id,
            config.client_id.clone(),
            config.client_secret.expose(),
            config.scope.clone(),
            timeout,
        )
        .map_err(|e| DirectoryError::from(InfraError::from(e)))?;

        debug!(token_url = %credentials.token_url, "configured token endpoint");

        let client = ClientCredentialsClient::new(credentials)
            .map_err(|e| DirectoryError::from(InfraError::from(e)))?;
        let skew = Duration::from_secs(config.token_skew_seconds);

        Ok(Self::new(Arc::new(TokenManager::new(client, skew))))
    }
}

impl<E: TokenExchange, C: Clock> DirectoryAuthService<E, C> {
    /// Wrap an existing token manager
    pub fn new(tokens: Arc<TokenManager<E, C>>) -> Self {
        Self { tokens }
    }

    /// Shared credential cache
    pub fn token_manager(&self) -> &Arc<TokenManager<E, C>> {
        &self.tokens
    }

    /// Drop the cached credential so the next request exchanges again
    pub async fn invalidate(&self) {
        self.tokens.invalidate().await;
    }
}

#[async_trait]
impl<E: TokenExchange, C: Clock> AccessTokenProvider for DirectoryAuthService<E, C> {
    async fn ensure_credential(&self) -> Result<String, DirectoryError> {
        self.tokens
            .ensure_credential()
            .await
            .map_err(|e| DirectoryError::from(InfraError::from(e)))
    }
}
