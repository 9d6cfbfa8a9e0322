//! Mapping from `whatsapp-rust` shapes to session types.

use crate::session::{AckStatus, InboundMessage};
use wacore::types::message::MessageInfo;
use wacore::types::presence::ReceiptType;
use waproto::whatsapp as wa;

/// Plain text of a message: conversation body, extended text, or media caption.
pub(super) fn message_text(msg: &wa::Message) -> String {
    if let Some(text) = &msg.conversation {
        return text.clone();
    }
    if let Some(ext) = &msg.extended_text_message
        && let Some(text) = &ext.text
    {
        return text.clone();
    }
    if let Some(img) = &msg.image_message
        && let Some(caption) = &img.caption
    {
        return caption.clone();
    }
    if let Some(video) = &msg.video_message
        && let Some(caption) = &video.caption
    {
        return caption.clone();
    }
    String::new()
}

pub(super) fn inbound(msg: &wa::Message, info: &MessageInfo) -> InboundMessage {
    let push_name = if info.push_name.is_empty() {
        None
    } else {
        Some(info.push_name.clone())
    };

    InboundMessage {
        id: info.id.clone(),
        sender: info.source.sender.to_string(),
        chat: info.source.chat.to_string(),
        from_me: info.source.is_from_me,
        is_group: info.source.is_group,
        text: message_text(msg),
        timestamp: info.timestamp,
        push_name,
    }
}

/// Receipts that advance an outbound message's delivery stage.
///
/// `ReadSelf` is another of our own devices reading an inbound message, not a
/// read receipt for something we sent.
pub(super) fn ack_status(kind: &ReceiptType) -> Option<AckStatus> {
    match kind {
        ReceiptType::Delivered => Some(AckStatus::Delivered),
        ReceiptType::Read => Some(AckStatus::Read),
        _ => None,
    }
}
