//! Modular common utilities shared across guestdir crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: time abstractions (injectable clock)
//! - `runtime`: async infrastructure and tracing
//! - `platform`: platform integrations (client-credentials auth, token cache)
//! - `test-utils`: mock token exchange for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod time;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "platform")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{
    CachedCredential, ClientCredentialsClient, ClientCredentialsConfig, OAuthClientError,
    TokenExchange, TokenManager, TokenManagerError, TokenResponse,
};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
