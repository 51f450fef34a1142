//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::{OAuthClientError, TokenExchange, TokenResponse};

/// Call-counting token exchange
///
/// Clones share counters and switches, so a test can keep one handle while
/// the [`TokenManager`](crate::auth::TokenManager) owns another.
///
/// # Examples
///
/// ```
/// use guestdir_common::auth::TokenExchange;
/// use guestdir_common::testing::MockTokenExchange;
///
/// # tokio_test::block_on(async {
/// let exchange = MockTokenExchange::new("token", 3600);
/// let response = exchange.exchange().await.unwrap();
/// assert_eq!(response.access_token, "token");
/// assert_eq!(exchange.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockTokenExchange {
    access_token: Arc<str>,
    expires_in: Arc<AtomicI64>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl MockTokenExchange {
    /// Mock that grants `access_token` for `expires_in` seconds
    pub fn new(access_token: &str, expires_in: i64) -> Self {
        Self {
            access_token: Arc::from(access_token),
            expires_in: Arc::new(AtomicI64::new(expires_in)),
            calls: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
            delay: None,
        }
    }

    /// Sleep before answering, to widen race windows
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make subsequent exchanges fail with an `invalid_client` error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Change the lifetime granted by subsequent exchanges
    pub fn set_expires_in(&self, expires_in: i64) {
        self.expires_in.store(expires_in, Ordering::SeqCst);
    }

    /// Number of exchanges attempted so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchange for MockTokenExchange {
    async fn exchange(&self) -> Result<TokenResponse, OAuthClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(OAuthClientError::UnexpectedStatus {
                status: 401,
                body: r#"{"error":"invalid_client"}"#.to_string(),
            });
        }

        let expires_in = self.expires_in.load(Ordering::SeqCst);
        Ok(TokenResponse {
            token_type: "Bearer".to_string(),
            expires_in,
            ext_expires_in: Some(expires_in),
            access_token: self.access_token.to_string(),
        })
    }
}
