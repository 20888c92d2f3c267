//! Error types and retry classification for the quote cache crate.
//!
//! This module provides:
//! - [`QuoteFetchError`]: The error returned by the fetch engine
//! - [`ProviderError`]: Failures reported by an upstream quote provider
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors returned by [`QuoteFetcher::fetch`](crate::QuoteFetcher::fetch).
///
/// Both variants are routine outcomes. Neither one leaves partial data in the cache.
#[derive(Error, Debug)]
pub enum QuoteFetchError {
    /// The request was malformed (empty reference currency or empty field set).
    /// Nothing was read from or written to the cache.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(&'static str),

    /// The upstream provider call failed.
    /// The provider's error is carried unchanged.
    #[error("Upstream failure: {0}")]
    UpstreamFailure(#[from] ProviderError),
}

impl QuoteFetchError {
    /// Returns the provider error when this is an upstream failure.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::UpstreamFailure(e) => Some(e),
            Self::InvalidArguments(_) => None,
        }
    }
}

/// Errors that an upstream quote provider can report.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request did not complete in time.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {provider}: {message}")]
    Http {
        /// The provider that returned the status
        provider: String,
        /// The HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ProviderError {
    /// Returns the retry classification for this error.
    ///
    /// The fetch engine never retries on its own. Layers above it (or a
    /// [`RetryingProvider`](crate::provider::RetryingProvider) wrapped around
    /// the upstream) use this to decide whether another attempt can help.
    ///
    /// # Examples
    ///
    /// ```
    /// use quote_cache::errors::{ProviderError, RetryClass};
    ///
    /// let error = ProviderError::RateLimited { provider: "QUOTES_API".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = ProviderError::Deserialization("missing field `quotes`".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } | Self::Timeout { .. } => RetryClass::WithBackoff,

            // 5xx is the server's problem and may clear up, 4xx will not
            Self::Http { status, .. } if *status >= 500 => RetryClass::WithBackoff,
            Self::Http { .. } => RetryClass::Never,

            Self::Network(e) if e.is_timeout() || e.is_connect() => RetryClass::WithBackoff,

            Self::Deserialization(_) | Self::Network(_) => RetryClass::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = ProviderError::RateLimited {
            provider: "QUOTES_API".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = ProviderError::Timeout {
            provider: "QUOTES_API".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_server_error_retries_client_error_does_not() {
        let server = ProviderError::Http {
            provider: "QUOTES_API".to_string(),
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(server.retry_class(), RetryClass::WithBackoff);

        let client = ProviderError::Http {
            provider: "QUOTES_API".to_string(),
            status: 400,
            message: "Bad Request".to_string(),
        };
        assert_eq!(client.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_deserialization_never_retries() {
        let error = ProviderError::Deserialization("expected value".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_upstream_failure_wraps_provider_error() {
        let error: QuoteFetchError = ProviderError::Timeout {
            provider: "QUOTES_API".to_string(),
        }
        .into();

        assert!(matches!(
            error.provider_error(),
            Some(ProviderError::Timeout { .. })
        ));
        assert!(QuoteFetchError::InvalidArguments("empty fields")
            .provider_error()
            .is_none());
    }

    #[test]
    fn test_error_display() {
        let error = QuoteFetchError::InvalidArguments("reference currency id is empty");
        assert_eq!(
            format!("{}", error),
            "Invalid arguments: reference currency id is empty"
        );

        let error = QuoteFetchError::UpstreamFailure(ProviderError::RateLimited {
            provider: "QUOTES_API".to_string(),
        });
        assert_eq!(format!("{}", error), "Upstream failure: Rate limited: QUOTES_API");

        let error = ProviderError::Http {
            provider: "QUOTES_API".to_string(),
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(format!("{}", error), "HTTP 502 from QUOTES_API: Bad Gateway");
    }
}
