//! Error types for the client library.

use thiserror::Error;

/// Errors that can occur when talking to an enclosure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Network or HTTP request failure.
    ///
    /// Indicates issues like DNS resolution, connection failures, TLS
    /// handshake errors, or request timeouts.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The enclosure rejected the configured credentials.
    #[error("Authentication rejected with status {status}")]
    Authentication {
        /// HTTP status code returned by the token endpoint.
        status: u16,
    },

    /// The token endpoint answered 2xx but the body carried no token.
    #[error("Authentication response did not contain an access token")]
    MissingToken,

    /// Unusable request parameters (bad URL, unknown HTTP method).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Check if this error happened below the HTTP layer.
    ///
    /// Transport failures are the only client errors a proxy caller may
    /// want to retry; everything else reflects the request or the device's
    /// answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
