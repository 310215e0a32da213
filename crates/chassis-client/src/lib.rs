//! # chassis-client
//!
//! Outbound HTTP client for enclosure management endpoints.
//!
//! This crate owns all traffic from chassisd to the enclosures themselves:
//! - Authentication against each device's own token endpoint
//! - Forwarding arbitrary authenticated API calls (transparent relay)
//!
//! The devices terminate TLS with self-signed certificates, so the one
//! [`reqwest`] client built here disables certificate validation. That
//! client is used exclusively for enclosure traffic; nothing else in the
//! process inherits the relaxed policy.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use chassis_client::{EnclosureApi, EnclosureClient};
//! use chassis_common::{EnclosureDescriptor, ProxyRequest};
//!
//! # async fn example() -> Result<(), chassis_client::ClientError> {
//! let client = EnclosureClient::new(Duration::from_secs(30))?;
//! let enclosure = EnclosureDescriptor::new(
//!     "rack1-top",
//!     "Rack 1 upper chassis",
//!     "10.0.0.1",
//!     "admin",
//!     "hunter2",
//! );
//!
//! let token = client.authenticate(&enclosure).await?;
//! let body = client
//!     .forward(&enclosure, &token, &ProxyRequest::new("GET", "api/status"))
//!     .await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use secrecy::SecretString;

use chassis_common::{EnclosureDescriptor, ProxyRequest};

pub mod error;
pub mod http;

pub use error::ClientError;
pub use http::EnclosureClient;

/// Trait for outbound enclosure API access.
///
/// This is the seam between the stateful session manager and the network:
/// the daemon holds an `Arc<dyn EnclosureApi>` and tests substitute mock
/// implementations. Implementations must be thread-safe (`Send + Sync`).
#[must_use = "EnclosureApi must be used to make requests"]
#[async_trait]
pub trait EnclosureApi: Send + Sync {
    /// Obtains a fresh bearer token from the enclosure.
    ///
    /// Issues `POST {base}/api/auth/token` with the descriptor's
    /// credentials and extracts the access token from the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level, the
    /// device rejects the credentials, or the response lacks a token field.
    async fn authenticate(
        &self,
        enclosure: &EnclosureDescriptor,
    ) -> Result<SecretString, ClientError>;

    /// Forwards a caller-specified call to the enclosure.
    ///
    /// Issues `{method} {base}/{path}` with `Authorization: Bearer {token}`
    /// and the optional JSON body. The response body is returned verbatim
    /// on **any** HTTP status; the relay does not interpret downstream
    /// status codes.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level failures (connection,
    /// TLS, timeout) or an unusable method/path.
    async fn forward(
        &self,
        enclosure: &EnclosureDescriptor,
        token: &SecretString,
        request: &ProxyRequest,
    ) -> Result<String, ClientError>;
}
