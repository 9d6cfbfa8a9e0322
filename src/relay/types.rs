//! Wire shapes exchanged with the chat backend.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

impl ChatRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Successful body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    /// Pull a usable reply out of an arbitrary JSON body.
    ///
    /// Only a non-empty string `response` field counts.
    pub fn from_value(body: &serde_json::Value) -> Option<Self> {
        body.get("response")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| Self {
                response: s.to_string(),
            })
    }
}

/// Body of `GET /health`. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub chatbot_status: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.chatbot_status.as_deref().is_none_or(|s| s == "ready")
    }
}
