//! Reply client for a live WhatsApp connection.

use crate::session::{AckStatus, ChatClient, InboundMessage, OutboundMessage, SessionError, SessionEvent};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::mpsc;

use wacore_binary::jid::Jid;
use waproto::whatsapp as wa;
use whatsapp_rust::client::Client;

/// Sent messages remembered so delivery receipts can be logged with their text.
const RECENT_SENT: usize = 256;

/// A recently sent message and the furthest delivery stage seen for it.
struct Sent {
    message: OutboundMessage,
    stage: AckStatus,
}

/// Holds only a weak sender: the event stream belongs to the bot's callback.
pub(super) struct WhatsAppChat {
    client: OnceLock<Arc<Client>>,
    events: mpsc::WeakSender<SessionEvent>,
    recent: Mutex<VecDeque<Sent>>,
}

impl WhatsAppChat {
    pub(super) fn new(events: mpsc::WeakSender<SessionEvent>) -> Self {
        Self {
            client: OnceLock::new(),
            events,
            recent: Mutex::new(VecDeque::with_capacity(RECENT_SENT)),
        }
    }

    pub(super) fn attach(&self, client: Arc<Client>) {
        if self.client.set(client).is_err() {
            tracing::warn!("WhatsApp: reply client already attached");
        }
    }

    /// Move a recently sent message to `status`.
    ///
    /// Receipts may arrive out of order; only a later stage than the one
    /// already seen returns the message.
    pub(super) fn advance(&self, id: &str, status: AckStatus) -> Option<OutboundMessage> {
        let mut recent = self.recent.lock().ok()?;
        let sent = recent.iter_mut().find(|s| s.message.id == id)?;
        if status.code() <= sent.stage.code() {
            return None;
        }
        sent.stage = status;
        Some(sent.message.clone())
    }

    pub(super) fn remember(&self, message: OutboundMessage) {
        if let Ok(mut recent) = self.recent.lock() {
            if recent.len() == RECENT_SENT {
                recent.pop_front();
            }
            recent.push_back(Sent {
                message,
                stage: AckStatus::Sent,
            });
        }
    }

    fn client(&self) -> Result<&Arc<Client>, SessionError> {
        self.client.get().ok_or(SessionError::Closed)
    }

    fn notify(&self, event: SessionEvent) {
        let Some(events) = self.events.upgrade() else {
            tracing::debug!("WhatsApp: event stream closed, dropping {}", event.kind());
            return;
        };
        if let Err(e) = events.try_send(event) {
            tracing::debug!("WhatsApp: dropped lifecycle event: {}", e);
        }
    }
}

fn parse_jid(raw: &str) -> Result<Jid, SessionError> {
    raw.parse::<Jid>()
        .map_err(|e| SessionError::Transport(format!("invalid jid '{}': {}", raw, e)))
}

#[async_trait]
impl ChatClient for WhatsAppChat {
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<OutboundMessage, SessionError> {
        let client = self.client()?;
        let jid = parse_jid(&to.chat)?;

        let message = wa::Message {
            conversation: Some(text.to_string()),
            ..Default::default()
        };

        let id = client
            .send_message(jid, message)
            .await
            .map_err(|e| SessionError::Send {
                chat: to.chat.clone(),
                reason: e.to_string(),
            })?;

        let sent = OutboundMessage {
            id,
            chat: to.chat.clone(),
            text: text.to_string(),
            timestamp: chrono::Utc::now(),
        };

        self.remember(sent.clone());
        self.notify(SessionEvent::MessageCreated(sent.clone()));
        self.notify(SessionEvent::DeliveryAck {
            message: sent.clone(),
            status: AckStatus::Sent,
        });

        Ok(sent)
    }

    async fn send_typing(&self, chat: &str) -> Result<(), SessionError> {
        let client = self.client()?;
        let jid = parse_jid(chat)?;
        client
            .chatstate()
            .send_composing(&jid)
            .await
            .map_err(|e| SessionError::Transport(format!("composing indicator failed: {}", e)))
    }
}
