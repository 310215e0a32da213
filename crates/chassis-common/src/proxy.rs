//! Proxy call descriptors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validation failure for a [`ProxyRequest`].
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProxyRequestError {
    /// The HTTP method was empty.
    #[error("Proxy request must include a method")]
    EmptyMethod,

    /// The relative path was empty.
    #[error("Proxy request must include a path")]
    EmptyPath,
}

/// A caller-specified HTTP call to forward to an enclosure.
///
/// The front door deserializes these from its own transport; the legacy
/// field names `url` and `data` are accepted as aliases for `path` and
/// `body`.
///
/// # Example
///
/// ```
/// use chassis_common::ProxyRequest;
///
/// let request = ProxyRequest::new("POST", "api/fans/1")
///     .with_body(serde_json::json!({"speed": "auto"}));
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRequest {
    /// HTTP method to issue downstream (case-insensitive).
    pub method: String,
    /// Path relative to the enclosure's base URL.
    #[serde(alias = "url")]
    pub path: String,
    /// Optional JSON body to forward.
    #[serde(default, alias = "data", skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl ProxyRequest {
    /// Creates a request without a body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body: None,
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Checks that the method and path are present.
    ///
    /// # Errors
    ///
    /// Returns an error if either field is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), ProxyRequestError> {
        if self.method.trim().is_empty() {
            return Err(ProxyRequestError::EmptyMethod);
        }
        if self.path.trim().is_empty() {
            return Err(ProxyRequestError::EmptyPath);
        }
        Ok(())
    }
}
