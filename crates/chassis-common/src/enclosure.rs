//! Enclosure descriptors and session status snapshots.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Static description of one managed enclosure.
///
/// Loaded once at startup and never mutated afterwards. The set of
/// descriptors fixes the set of sessions for the lifetime of the process.
///
/// # Security
///
/// The management password is stored as a [`SecretString`] so it is
/// redacted from `Debug` output and zeroed on drop. Descriptors are
/// deliberately not serializable.
#[derive(Debug, Clone, Deserialize)]
pub struct EnclosureDescriptor {
    /// Opaque identifier, unique across the fleet.
    pub id: String,
    /// Human-readable display name, used in diagnostics and error messages.
    pub name: String,
    /// Network address of the management endpoint.
    ///
    /// Either a bare host (`10.0.0.1`), which is reached over HTTPS, or a
    /// full base URL used verbatim.
    pub address: String,
    /// Management API username.
    pub username: String,
    /// Management API password (redacted from `Debug`).
    pub password: SecretString,
}

impl EnclosureDescriptor {
    /// Creates a descriptor from its parts.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Base URL of the enclosure's management API.
    ///
    /// Bare hosts get an `https://` scheme; addresses that already carry a
    /// scheme are used as-is. Trailing slashes are stripped so callers can
    /// append paths with a single `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let address = self.address.trim_end_matches('/');
        if address.contains("://") {
            address.to_string()
        } else {
            format!("https://{address}")
        }
    }
}

/// Read-only snapshot of one enclosure's session state.
///
/// Carries no token material; safe to log or serve from a status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// Enclosure identifier.
    pub id: String,
    /// Enclosure display name.
    pub name: String,
    /// Whether a bearer token is currently held.
    pub has_token: bool,
    /// Time of the last successful refresh, if any.
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_base_url_bare_host() {
        let enclosure = EnclosureDescriptor::new("e1", "E1", "10.0.0.1", "admin", "pw");
        assert_eq!(enclosure.base_url(), "https://10.0.0.1");
    }

    #[test]
    fn test_base_url_with_scheme() {
        let enclosure =
            EnclosureDescriptor::new("e1", "E1", "http://127.0.0.1:8080/", "admin", "pw");
        assert_eq!(enclosure.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_debug_redacts_password() {
        let enclosure = EnclosureDescriptor::new("e1", "E1", "10.0.0.1", "admin", "s3cret");
        let debug = format!("{enclosure:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("e1"));
    }

    #[test]
    fn test_deserialize_descriptor() {
        let enclosure: EnclosureDescriptor = serde_json::from_str(
            r#"{
                "id": "rack1-top",
                "name": "Rack 1 upper chassis",
                "address": "10.0.0.1",
                "username": "admin",
                "password": "pw"
            }"#,
        )
        .unwrap();

        assert_eq!(enclosure.id, "rack1-top");
        assert_eq!(enclosure.base_url(), "https://10.0.0.1");
    }
}
