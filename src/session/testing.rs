//! Test doubles for the chat and relay seams.

use super::error::{Result, SessionError};
use super::events::{InboundMessage, OutboundMessage};
use super::transport::ChatClient;
use crate::relay::Relay;
use async_trait::async_trait;
use std::sync::Mutex;

/// Chat client that records what would have been sent.
#[derive(Default)]
pub struct RecordingChat {
    replies: Mutex<Vec<(String, String)>>,
    typing: Mutex<Vec<String>>,
    attempts: Mutex<usize>,
    fail_replies: bool,
    fail_typing: bool,
}

impl RecordingChat {
    pub fn failing_replies(mut self) -> Self {
        self.fail_replies = true;
        self
    }

    pub fn failing_typing(mut self) -> Self {
        self.fail_typing = true;
        self
    }

    /// (chat, text) pairs that were sent successfully.
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn typing(&self) -> Vec<String> {
        self.typing.lock().unwrap().clone()
    }

    pub fn reply_attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<OutboundMessage> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail_replies {
            return Err(SessionError::Send {
                chat: to.chat.clone(),
                reason: "mock send failure".to_string(),
            });
        }
        self.replies
            .lock()
            .unwrap()
            .push((to.chat.clone(), text.to_string()));
        Ok(OutboundMessage {
            id: format!("out-{}", self.replies.lock().unwrap().len()),
            chat: to.chat.clone(),
            text: text.to_string(),
            timestamp: chrono::Utc::now(),
        })
    }

    async fn send_typing(&self, chat: &str) -> Result<()> {
        if self.fail_typing {
            return Err(SessionError::Transport("mock presence failure".to_string()));
        }
        self.typing.lock().unwrap().push(chat.to_string());
        Ok(())
    }
}

/// Relay that answers with a fixed string and records its inputs.
pub struct ScriptedRelay {
    reply: String,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRelay {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Relay for ScriptedRelay {
    async fn relay(&self, text: &str) -> String {
        self.calls.lock().unwrap().push(text.to_string());
        self.reply.clone()
    }
}
