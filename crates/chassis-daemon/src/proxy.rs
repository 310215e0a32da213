//! Authenticated proxying of caller-specified API calls.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use chassis_client::{ClientError, EnclosureApi};
use chassis_common::ProxyRequest;

use crate::sessions::SessionStore;

/// Errors surfaced to proxy callers.
///
/// Messages identify enclosures by name and never contain token or
/// password material.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProxyError {
    /// The id matched no configured enclosure; a caller error.
    #[error("Unknown enclosure: {0}")]
    UnknownEnclosure(String),

    /// The session holds no usable token right now.
    ///
    /// Transient: a refresh is pending, the caller should retry after the
    /// next cycle.
    #[error("No valid token for {name}: a token refresh is pending, retry shortly")]
    NoValidToken {
        /// Display name of the enclosure.
        name: String,
    },

    /// The call descriptor was unusable (empty method or path).
    #[error("Invalid proxy request: {0}")]
    InvalidRequest(String),

    /// Network-level failure while forwarding the call.
    #[error("Transport failure while proxying to {name}: {source}")]
    Transport {
        /// Display name of the enclosure.
        name: String,
        /// The underlying client error.
        #[source]
        source: ClientError,
    },
}

impl ProxyError {
    /// Check if the caller may succeed by simply retrying later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::NoValidToken { .. } => true,
            Self::Transport { source, .. } => source.is_transport(),
            Self::UnknownEnclosure(_) | Self::InvalidRequest(_) => false,
        }
    }
}

/// Forwards authenticated calls to enclosures using stored session tokens.
///
/// The proxy is a pure reader of the session store: it never triggers a
/// refresh and never touches the refreshing flag.
pub struct ProxyService {
    store: Arc<SessionStore>,
    api: Arc<dyn EnclosureApi>,
}

impl ProxyService {
    /// Creates a proxy over the given store and outbound client.
    pub fn new(store: Arc<SessionStore>, api: Arc<dyn EnclosureApi>) -> Self {
        Self { store, api }
    }

    /// Forwards one call to the named enclosure.
    ///
    /// Exactly one downstream attempt is made; callers own retries. The
    /// downstream body is returned verbatim whatever its status code.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::InvalidRequest`] for an empty method or path
    /// - [`ProxyError::UnknownEnclosure`] when the id has no session
    /// - [`ProxyError::NoValidToken`] when no token is currently held
    /// - [`ProxyError::Transport`] for network failures while forwarding
    ///
    /// The first three are decided before any network call is attempted.
    pub async fn proxy_call(&self, id: &str, request: &ProxyRequest) -> Result<String, ProxyError> {
        request
            .validate()
            .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;

        let view = self
            .store
            .session_view(id)
            .await
            .ok_or_else(|| ProxyError::UnknownEnclosure(id.to_string()))?;

        let Some(token) = view.token else {
            debug!(name = %view.descriptor.name, "Proxy call refused, no token held");
            return Err(ProxyError::NoValidToken {
                name: view.descriptor.name.clone(),
            });
        };

        self.api
            .forward(&view.descriptor, &token, request)
            .await
            .map_err(|source| {
                warn!(
                    name = %view.descriptor.name,
                    error = %source,
                    "Proxy forwarding failed"
                );
                // A rejected method or URL is the caller's fault, not the
                // network's.
                match source {
                    ClientError::Configuration(message) => ProxyError::InvalidRequest(message),
                    source => ProxyError::Transport {
                        name: view.descriptor.name.clone(),
                        source,
                    },
                }
            })
    }
}
