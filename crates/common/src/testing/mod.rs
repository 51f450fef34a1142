//! Testing utilities and helpers
//!
//! - **[`mocks`]**: Mock implementations of common traits
//! - Clock mocking lives in [`crate::time`] and is re-exported here
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use guestdir_common::auth::TokenManager;
//! use guestdir_common::testing::{MockClock, MockTokenExchange};
//!
//! let exchange = MockTokenExchange::new("token", 3600);
//! let clock = MockClock::new();
//! let _manager = TokenManager::with_clock(exchange, clock.clone(), Duration::from_secs(60));
//! clock.advance(Duration::from_secs(5));
//! ```

pub mod mocks;

pub use mocks::MockTokenExchange;

pub use crate::time::{Clock, MockClock, SystemClock};
