//! # guestdir Infrastructure
//!
//! Networked implementations of the guest directory client.
//!
//! This crate contains:
//! - HTTP client with timeout and opt-in transport retry
//! - Authenticated directory API client (decode + error classification)
//! - Guest lifecycle operations (get, invite, delete, find by mail)
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Domain types and errors come from `guestdir-domain`
//! - Token acquisition and caching come from `guestdir-common`
//! - Contains all "impure" code (network and file I/O)

pub mod api;
pub mod config;
pub mod errors;
pub mod guest;
pub mod http;

// Re-export commonly used items
pub use api::{
    AccessTokenProvider, ApiClient, ApiClientBuilder, ApiClientConfig, DirectoryAuthService,
};
pub use errors::InfraError;
pub use guest::GuestService;
pub use http::{HttpClient, HttpClientBuilder};
