//! Concrete [`EnclosureApi`] implementation over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use chassis_common::{EnclosureDescriptor, ProxyRequest};

use crate::error::ClientError;
use crate::EnclosureApi;

/// Relative path of the device token endpoint.
const AUTH_PATH: &str = "api/auth/token";

/// Credentials payload for the token endpoint.
#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Token endpoint response.
///
/// Current firmware returns `access_token`; releases predating the rename
/// used `token`, so both are accepted.
#[derive(Deserialize)]
struct AuthResponse {
    #[serde(alias = "token")]
    access_token: Option<String>,
}

/// HTTP client for enclosure management endpoints.
///
/// One shared [`reqwest::Client`] serves every enclosure; connection
/// pooling falls out of that for free. The client accepts the devices'
/// self-signed certificates and bounds every request with the configured
/// timeout so a hung device cannot pin an in-flight slot forever.
#[derive(Debug, Clone)]
pub struct EnclosureClient {
    client: reqwest::Client,
}

impl EnclosureClient {
    /// Creates a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        // Enclosures present self-signed certificates. This client is used
        // for enclosure traffic only, so the relaxed trust policy never
        // applies to other outbound calls the host process makes.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    fn parse_url(raw: &str) -> Result<reqwest::Url, ClientError> {
        reqwest::Url::parse(raw)
            .map_err(|e| ClientError::Configuration(format!("Invalid URL '{raw}': {e}")))
    }
}

#[async_trait]
impl EnclosureApi for EnclosureClient {
    async fn authenticate(
        &self,
        enclosure: &EnclosureDescriptor,
    ) -> Result<SecretString, ClientError> {
        let url = Self::parse_url(&format!("{}/{AUTH_PATH}", enclosure.base_url()))?;

        debug!("Requesting token from {}", enclosure.name);

        let response = self
            .client
            .post(url)
            .json(&AuthRequest {
                username: &enclosure.username,
                password: enclosure.password.expose_secret(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(
                "Token endpoint on {} answered {}",
                enclosure.name,
                status.as_u16()
            );
            return Err(ClientError::Authentication {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: AuthResponse = serde_json::from_str(&body)?;

        parsed
            .access_token
            .map(SecretString::from)
            .ok_or(ClientError::MissingToken)
    }

    async fn forward(
        &self,
        enclosure: &EnclosureDescriptor,
        token: &SecretString,
        request: &ProxyRequest,
    ) -> Result<String, ClientError> {
        let method = reqwest::Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| {
                ClientError::Configuration(format!("Invalid HTTP method '{}'", request.method))
            })?;

        let url = Self::parse_url(&format!(
            "{}/{}",
            enclosure.base_url(),
            request.path.trim_start_matches('/')
        ))?;

        debug!(
            "Forwarding {} {} to {}",
            request.method, request.path, enclosure.name
        );

        let mut builder = self.client.request(method, url).header(
            "Authorization",
            format!("Bearer {}", token.expose_secret()),
        );

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Transparent relay: downstream status codes are the caller's to
        // interpret, so the body comes back verbatim either way.
        debug!(
            "Enclosure {} answered {} ({} bytes)",
            enclosure.name,
            status.as_u16(),
            body.len()
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_enclosure(base_url: &str) -> EnclosureDescriptor {
        EnclosureDescriptor::new("e1", "Test enclosure", base_url, "admin", "pw")
    }

    fn test_client() -> EnclosureClient {
        EnclosureClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .and(body_json(serde_json::json!({
                "username": "admin",
                "password": "pw"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1"
            })))
            .mount(&mock_server)
            .await;

        let token = test_client()
            .authenticate(&test_enclosure(&mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(token.expose_secret(), "tok-1");
    }

    #[tokio::test]
    async fn test_authenticate_accepts_legacy_token_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "tok-legacy"
            })))
            .mount(&mock_server)
            .await;

        let token = test_client()
            .authenticate(&test_enclosure(&mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(token.expose_secret(), "tok-legacy");
    }

    #[tokio::test]
    async fn test_authenticate_rejected_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "bad credentials"
            })))
            .mount(&mock_server)
            .await;

        let result = test_client()
            .authenticate(&test_enclosure(&mock_server.uri()))
            .await;

        assert!(matches!(
            result,
            Err(ClientError::Authentication { status: 401 })
        ));
    }

    #[tokio::test]
    async fn test_authenticate_missing_token_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok"
            })))
            .mount(&mock_server)
            .await;

        let result = test_client()
            .authenticate(&test_enclosure(&mock_server.uri()))
            .await;

        assert!(matches!(result, Err(ClientError::MissingToken)));
    }

    #[tokio::test]
    async fn test_authenticate_malformed_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = test_client()
            .authenticate(&test_enclosure(&mock_server.uri()))
            .await;

        assert!(matches!(result, Err(ClientError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_forward_attaches_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/status"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"power": "on"})),
            )
            .mount(&mock_server)
            .await;

        let body = test_client()
            .forward(
                &test_enclosure(&mock_server.uri()),
                &SecretString::from("tok-1"),
                &ProxyRequest::new("GET", "api/status"),
            )
            .await
            .unwrap();

        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"power": "on"})
        );
    }

    #[tokio::test]
    async fn test_forward_sends_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/fans/1"))
            .and(body_json(serde_json::json!({"speed": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let body = test_client()
            .forward(
                &test_enclosure(&mock_server.uri()),
                &SecretString::from("tok-1"),
                &ProxyRequest::new("post", "/api/fans/1")
                    .with_body(serde_json::json!({"speed": "auto"})),
            )
            .await
            .unwrap();

        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_forward_relays_downstream_errors_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(503).set_body_string("device busy"))
            .mount(&mock_server)
            .await;

        let body = test_client()
            .forward(
                &test_enclosure(&mock_server.uri()),
                &SecretString::from("tok-1"),
                &ProxyRequest::new("GET", "api/status"),
            )
            .await
            .unwrap();

        assert_eq!(body, "device busy");
    }

    #[tokio::test]
    async fn test_forward_rejects_invalid_method() {
        let result = test_client()
            .forward(
                &test_enclosure("http://127.0.0.1:1"),
                &SecretString::from("tok-1"),
                &ProxyRequest::new("GE T", "api/status"),
            )
            .await;

        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_forward_surfaces_transport_failure() {
        // Nothing listens on port 1; the connection is refused.
        let result = test_client()
            .forward(
                &test_enclosure("http://127.0.0.1:1"),
                &SecretString::from("tok-1"),
                &ProxyRequest::new("GET", "api/status"),
            )
            .await;

        assert!(result.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn test_authenticate_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "tok-1"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = EnclosureClient::new(Duration::from_millis(50)).unwrap();
        let result = client
            .authenticate(&test_enclosure(&mock_server.uri()))
            .await;

        assert!(matches!(result, Err(ClientError::Network(_))));
    }
}
