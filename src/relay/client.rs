//! Backend HTTP client
//!
//! One `POST {base_url}/chat` per relayed message. Never retries; every
//! failure collapses into a fixed fallback string for the chat.

use super::error::{RelayError, Result};
use super::types::{ChatRequest, ChatResponse, HealthStatus};
use crate::config::BackendConfig;
use crate::logging::preview;

/// Sent to the chat when the backend cannot be reached (or answers non-2xx).
pub const CONNECTION_FAILED_REPLY: &str = "Error: No se pudo conectar con el servidor";

/// Sent to the chat when the backend answers without a usable `response`.
pub const INVALID_RESPONSE_REPLY: &str = "Error: Respuesta inválida del servidor";

/// Client for the downstream chat backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(RelayError::Transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    /// Relay `text` and return the reply, or a fallback string on any failure.
    pub async fn relay(&self, text: &str) -> String {
        match self.try_relay(text).await {
            Ok(reply) => reply,
            Err(e) if e.is_invalid_response() => {
                tracing::warn!("Relay: {}", e);
                INVALID_RESPONSE_REPLY.to_string()
            }
            Err(e) => {
                tracing::error!("Relay: backend call failed: {}", e);
                CONNECTION_FAILED_REPLY.to_string()
            }
        }
    }

    /// Relay `text` and surface the typed failure.
    pub async fn try_relay(&self, text: &str) -> Result<String> {
        let url = self.chat_url();
        tracing::info!("Relay: POST {} ({} chars)", url, text.chars().count());
        tracing::debug!("Relay: request text: {:?}", preview(text, 200));

        let response = self
            .http
            .post(&url)
            .json(&ChatRequest::new(text))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Relay: HTTP {} from backend", status.as_u16());

        let raw = response.text().await?;

        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
                body: preview(&raw, 500).to_string(),
            });
        }

        let body: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| RelayError::InvalidResponse(format!("body is not JSON ({})", e)))?;

        match ChatResponse::from_value(&body) {
            Some(reply) => {
                tracing::info!("Relay: got reply: {:?}", preview(&reply.response, 80));
                Ok(reply.response)
            }
            None => Err(RelayError::InvalidResponse(preview(&raw, 500).to_string())),
        }
    }

    /// `GET {base_url}/health`.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        tracing::debug!("Relay: GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
                body: preview(&raw, 500).to_string(),
            });
        }

        serde_json::from_str(&raw).map_err(|e| RelayError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: url.to_string(),
            timeout_secs: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_relay_returns_response_field_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"text": "hola"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "¡Hola! ¿Cómo puedo ayudarte?"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let reply = client.relay("hola").await;

        assert_eq!(reply, "¡Hola! ¿Cómo puedo ayudarte?");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_relay_trailing_slash_in_base_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"response": "ok"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&format!("{}/", server.url()));
        assert_eq!(client.relay("x").await, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_relay_missing_field_is_invalid_format() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"answer": "wrong field"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert_eq!(client.relay("hola").await, INVALID_RESPONSE_REPLY);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_relay_non_json_body_is_invalid_format() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.try_relay("hola").await.unwrap_err();
        assert!(err.is_invalid_response());
    }

    #[tokio::test]
    async fn test_relay_error_status_is_connection_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .with_status(503)
            .with_body(r#"{"response": "should not be used"}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.try_relay("hola").await.unwrap_err();
        assert!(matches!(err, RelayError::Status { status: 503, .. }));
        assert_eq!(client.relay("hola").await, CONNECTION_FAILED_REPLY);
        // one call per relay, no retries
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_relay_unreachable_backend() {
        // Bind then drop a listener so the port is known to refuse connections
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr));
        assert_eq!(client.relay("hola").await, CONNECTION_FAILED_REPLY);
    }

    #[tokio::test]
    async fn test_relay_timeout_is_connection_failure() {
        // Accept connections and never answer
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = BackendClient::new(&BackendConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 1,
        })
        .unwrap();

        let err = client.try_relay("hola").await.unwrap_err();
        assert!(matches!(err, RelayError::Timeout), "unexpected error: {:?}", err);
        assert_eq!(client.relay("hola").await, CONNECTION_FAILED_REPLY);

        silent.abort();
    }

    #[tokio::test]
    async fn test_health() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status": "healthy", "chatbot_status": "ready"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let health = client.health().await.unwrap();
        assert!(health.is_healthy());
    }
}
