//! Authenticated directory API client
//!
//! Generic "authenticated HTTP call, decode JSON, classify errors" layer.
//! It knows nothing about guests; the [`guest`](crate::guest) module is built
//! on top of it.
//!
//! # Architecture
//!
//! - Uses the crate's `HttpClient` (no direct reqwest at call sites)
//! - Client-credentials authentication through `AccessTokenProvider`
//! - Single attempt by default; transport-only retry is opt-in

pub mod auth;
pub mod client;

pub use auth::{AccessTokenProvider, DirectoryAuthService};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
