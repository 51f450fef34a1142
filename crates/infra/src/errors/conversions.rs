//! Conversions from external infrastructure errors into domain errors.

use guestdir_common::auth::{OAuthClientError, TokenManagerError};
use guestdir_domain::DirectoryError;
use reqwest::Error as HttpError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DirectoryError);

impl From<InfraError> for DirectoryError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DirectoryError> for InfraError {
    fn from(value: DirectoryError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDirectoryError {
    fn into_directory(self) -> DirectoryError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DirectoryError */
/* -------------------------------------------------------------------------- */

impl IntoDirectoryError for HttpError {
    fn into_directory(self) -> DirectoryError {
        if self.is_timeout() {
            return DirectoryError::transport(format!("HTTP request timed out: {self}"));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return DirectoryError::transport(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return DirectoryError::config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return DirectoryError::transport(format!("failed to read response body: {self}"));
        }

        DirectoryError::transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_directory())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → DirectoryError */
/* -------------------------------------------------------------------------- */

impl IntoDirectoryError for UrlError {
    fn into_directory(self) -> DirectoryError {
        DirectoryError::config(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_directory())
    }
}

/* -------------------------------------------------------------------------- */
/* auth errors → DirectoryError */
/* -------------------------------------------------------------------------- */

impl IntoDirectoryError for OAuthClientError {
    fn into_directory(self) -> DirectoryError {
        match self {
            OAuthClientError::ConfigError(message) => DirectoryError::config(message),
            other => DirectoryError::authentication(other.to_string()),
        }
    }
}

impl From<OAuthClientError> for InfraError {
    fn from(value: OAuthClientError) -> Self {
        InfraError(value.into_directory())
    }
}

impl IntoDirectoryError for TokenManagerError {
    fn into_directory(self) -> DirectoryError {
        DirectoryError::authentication(self.to_string())
    }
}

impl From<TokenManagerError> for InfraError {
    fn from(value: TokenManagerError) -> Self {
        InfraError(value.into_directory())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::Client;

    use super::*;

    #[tokio::test]
    async fn connection_refused_maps_to_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: DirectoryError = InfraError::from(error).into();
        match mapped {
            DirectoryError::Transport { message } => {
                assert!(message.to_lowercase().contains("connection"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn url_parse_error_maps_to_config_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let mapped: DirectoryError = InfraError::from(err).into();
        assert!(matches!(mapped, DirectoryError::Config { .. }));
    }

    #[test]
    fn token_errors_map_to_authentication_error() {
        let err = TokenManagerError::InvalidLifetime(0);
        let mapped: DirectoryError = InfraError::from(err).into();
        match mapped {
            DirectoryError::Authentication { message } => assert!(message.contains("expires_in")),
            other => panic!("expected authentication error, got {other:?}"),
        }

        let err = OAuthClientError::UnexpectedStatus { status: 400, body: "nope".into() };
        let mapped: DirectoryError = InfraError::from(err).into();
        assert!(matches!(mapped, DirectoryError::Authentication { .. }));
    }

    #[test]
    fn oauth_config_error_stays_config() {
        let err = OAuthClientError::ConfigError("tenant id must not be empty".into());
        let mapped: DirectoryError = InfraError::from(err).into();
        assert!(matches!(mapped, DirectoryError::Config { .. }));
    }
}
