//! # guestdir Domain
//!
//! Domain types for the guest directory client.
//!
//! This crate contains:
//! - Guest identity and invitation payloads
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Directory constants
//!
//! ## Architecture
//! - No dependencies on other guestdir crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
