//! Session events and the transient message shapes they carry.

use chrono::{DateTime, Utc};
use std::fmt;

/// A chat message received from the session. Read once, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Transport-assigned message id (used to quote the reply).
    pub id: String,
    pub sender: String,
    pub chat: String,
    pub from_me: bool,
    pub is_group: bool,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Contact display name, when the transport knows it.
    pub push_name: Option<String>,
}

impl InboundMessage {
    /// A direct (one-to-one) message from someone else.
    pub fn direct(sender: impl Into<String>, text: impl Into<String>) -> Self {
        let sender = sender.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat: sender.clone(),
            sender,
            from_me: false,
            is_group: false,
            text: text.into(),
            timestamp: Utc::now(),
            push_name: None,
        }
    }

    pub fn in_group(mut self, chat: impl Into<String>) -> Self {
        self.chat = chat.into();
        self.is_group = true;
        self
    }

    pub fn from_self(mut self) -> Self {
        self.from_me = true;
        self
    }
}

/// A message the bot created in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub id: String,
    pub chat: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Delivery stage reported for an outbound message.
///
/// Stages only move forward: sent, delivered to device, read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AckStatus {
    Sent,
    Delivered,
    Read,
    Unknown(i32),
}

impl AckStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => AckStatus::Sent,
            2 => AckStatus::Delivered,
            3 => AckStatus::Read,
            other => AckStatus::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            AckStatus::Sent => 1,
            AckStatus::Delivered => 2,
            AckStatus::Read => 3,
            AckStatus::Unknown(c) => c,
        }
    }
}

impl fmt::Display for AckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AckStatus::Sent => write!(f, "sent to server"),
            AckStatus::Delivered => write!(f, "delivered to device"),
            AckStatus::Read => write!(f, "read by user"),
            AckStatus::Unknown(code) => write!(f, "unknown ({})", code),
        }
    }
}

/// Notifications from the messaging session, consumed one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Pairing required; `code` is the artifact to show as a QR.
    PairingCode { code: String },
    Authenticated,
    Ready,
    MessageReceived(InboundMessage),
    MessageCreated(OutboundMessage),
    DeliveryAck {
        message: OutboundMessage,
        status: AckStatus,
    },
    Disconnected,
    LoggedOut,
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::PairingCode { .. } => "pairing_code",
            SessionEvent::Authenticated => "authenticated",
            SessionEvent::Ready => "ready",
            SessionEvent::MessageReceived(_) => "message_received",
            SessionEvent::MessageCreated(_) => "message_created",
            SessionEvent::DeliveryAck { .. } => "delivery_ack",
            SessionEvent::Disconnected => "disconnected",
            SessionEvent::LoggedOut => "logged_out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_codes() {
        assert_eq!(AckStatus::from_code(1), AckStatus::Sent);
        assert_eq!(AckStatus::from_code(2), AckStatus::Delivered);
        assert_eq!(AckStatus::from_code(3), AckStatus::Read);
        assert_eq!(AckStatus::from_code(7), AckStatus::Unknown(7));
        assert_eq!(AckStatus::from_code(3).code(), 3);
        assert_eq!(AckStatus::Unknown(-1).to_string(), "unknown (-1)");
    }

    #[test]
    fn test_ack_stages_increase() {
        assert!(AckStatus::Sent < AckStatus::Delivered);
        assert!(AckStatus::Delivered < AckStatus::Read);
    }

    #[test]
    fn test_message_builders() {
        let msg = InboundMessage::direct("5491100000000", "hola");
        assert_eq!(msg.chat, msg.sender);
        assert!(!msg.from_me && !msg.is_group);

        let group = InboundMessage::direct("a", "b").in_group("family");
        assert!(group.is_group);
        assert_eq!(group.chat, "family");

        assert!(InboundMessage::direct("a", "b").from_self().from_me);
    }
}
