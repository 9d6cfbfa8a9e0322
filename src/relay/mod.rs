//! Message Relay
//!
//! Forwards inbound chat text to the HTTP backend and sends its reply back.

mod client;
mod error;
mod handler;
mod types;

pub use client::{BackendClient, CONNECTION_FAILED_REPLY, INVALID_RESPONSE_REPLY};
pub use error::RelayError;
pub use handler::{
    EMPTY_TEXT_REPLY, HandleOutcome, INTERNAL_ERROR_REPLY, MessageHandler, TEST_COMMAND_REPLY,
};
pub use types::{ChatRequest, ChatResponse, HealthStatus};

use async_trait::async_trait;

/// Turns message text into reply text. Infallible by contract: failures come
/// back as fallback strings.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn relay(&self, text: &str) -> String;
}

#[async_trait]
impl Relay for BackendClient {
    async fn relay(&self, text: &str) -> String {
        BackendClient::relay(self, text).await
    }
}
