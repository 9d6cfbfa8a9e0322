//! Inbound message handling
//!
//! Filters, local commands, then one relay round-trip per message. Every
//! message is handled on its own; nothing carries over between calls.

use super::Relay;
use crate::logging::preview;
use crate::session::{ChatClient, InboundMessage, SessionError};
use std::sync::Arc;

/// Reply for messages with no text (media, stickers, whitespace).
pub const EMPTY_TEXT_REPLY: &str = "Por favor envía un mensaje con texto 📝";

/// Reply for the reserved test command.
pub const TEST_COMMAND_REPLY: &str = "🤖 ¡Bot funcionando correctamente!";

/// Reply when handling fails for reasons other than the backend.
pub const INTERNAL_ERROR_REPLY: &str = "❌ Error interno. Intenta nuevamente.";

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    IgnoredOwnMessage,
    IgnoredGroup,
    PromptedForText,
    AnsweredTestCommand,
    Relayed,
    /// The relay produced nothing to send.
    EmptyRelayResult,
    /// Handling failed; the generic error reply was attempted.
    Failed,
}

pub struct MessageHandler {
    relay: Arc<dyn Relay>,
    chat: Arc<dyn ChatClient>,
    test_command: String,
}

impl MessageHandler {
    pub fn new(relay: Arc<dyn Relay>, chat: Arc<dyn ChatClient>, test_command: impl Into<String>) -> Self {
        Self {
            relay,
            chat,
            test_command: test_command.into(),
        }
    }

    pub async fn handle_message(&self, msg: &InboundMessage) -> HandleOutcome {
        tracing::info!(
            "Session: message {} from {} in {} (from_me={}, group={}): {:?}",
            msg.id,
            msg.sender,
            msg.chat,
            msg.from_me,
            msg.is_group,
            preview(&msg.text, 50),
        );

        match self.process(msg).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Session: failed handling message {}: {}", msg.id, e);
                match self.chat.reply(msg, INTERNAL_ERROR_REPLY).await {
                    Ok(_) => tracing::warn!("Session: sent error reply to {}", msg.chat),
                    Err(reply_err) => {
                        tracing::error!("Session: could not send error reply to {}: {}", msg.chat, reply_err)
                    }
                }
                HandleOutcome::Failed
            }
        }
    }

    async fn process(&self, msg: &InboundMessage) -> Result<HandleOutcome, SessionError> {
        if msg.from_me {
            tracing::debug!("Session: ignoring own message {}", msg.id);
            return Ok(HandleOutcome::IgnoredOwnMessage);
        }

        if msg.is_group {
            tracing::debug!("Session: ignoring group message in {}", msg.chat);
            return Ok(HandleOutcome::IgnoredGroup);
        }

        if let Some(name) = &msg.push_name {
            tracing::debug!("Session: contact {} ({})", name, msg.sender);
        }

        let text = msg.text.trim();

        if text.is_empty() {
            tracing::info!("Session: empty message from {}, asking for text", msg.sender);
            self.chat.reply(msg, EMPTY_TEXT_REPLY).await?;
            return Ok(HandleOutcome::PromptedForText);
        }

        if self.is_test_command(text) {
            tracing::info!("Session: test command from {}", msg.sender);
            let sent = self.chat.reply(msg, TEST_COMMAND_REPLY).await?;
            tracing::debug!("Session: test reply sent as {}", sent.id);
            return Ok(HandleOutcome::AnsweredTestCommand);
        }

        self.chat.send_typing(&msg.chat).await?;

        let reply = self.relay.relay(text).await;
        if reply.is_empty() {
            tracing::warn!("Session: relay returned nothing for message {}", msg.id);
            return Ok(HandleOutcome::EmptyRelayResult);
        }

        let sent = self.chat.reply(msg, &reply).await?;
        tracing::info!("Session: replied to {} with message {}", msg.chat, sent.id);
        Ok(HandleOutcome::Relayed)
    }

    fn is_test_command(&self, text: &str) -> bool {
        text.to_lowercase() == self.test_command.to_lowercase()
    }
}
