//! Time utilities and abstractions
//!
//! - **Clock abstractions**: real and mock wall-clock time, so credential
//!   expiry can be tested without waiting
//!
//! ## Usage
//!
//! ```rust
//! use guestdir_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance_secs(5);
//! assert_eq!((clock.now() - start).num_seconds(), 5);
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
