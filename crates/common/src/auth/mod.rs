//! OAuth 2.0 client-credentials infrastructure
//!
//! Application-only authentication against a directory's identity provider.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  Cached credential + single-flight refresh
//! └────────┬────────┘
//!          │
//!          └──► TokenExchange            (trait)
//!                    │
//!                    └──► ClientCredentialsClient  (form POST to token endpoint)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use guestdir_common::auth::{ClientCredentialsClient, ClientCredentialsConfig, TokenManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientCredentialsConfig::for_tenant(
//!     "https://login.microsoftonline.com",
//!     "contoso.onmicrosoft.com",
//!     "app-id",
//!     "app-secret",
//!     "https://graph.microsoft.com/.default",
//!     Duration::from_secs(120),
//! )?;
//!
//! let manager = TokenManager::new(ClientCredentialsClient::new(config)?, Duration::from_secs(60));
//! let authorization = manager.ensure_credential().await?;
//! assert!(authorization.starts_with("Bearer "));
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: config, token response, cached credential
//! - **[`client`]**: token endpoint HTTP client
//! - **[`traits`]**: `TokenExchange` seam for mocking
//! - **[`token_manager`]**: credential cache

pub mod client;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use client::{ClientCredentialsClient, OAuthClientError};
pub use token_manager::{TokenManager, TokenManagerError};
pub use traits::TokenExchange;
pub use types::{
    CachedCredential, ClientCredentialsConfig, OAuthError, SecretString, TokenResponse,
};
