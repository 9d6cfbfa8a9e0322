//! WhatsApp transport
//!
//! Builds the bot, forwards its events into the session channel, and hands
//! back a reply client bound to the same connection.

use super::client::WhatsAppChat;
use super::convert;
use crate::session::{
    EventSender, SessionError, SessionEvent, SessionHandle, SessionStore, SessionTransport,
};
use async_trait::async_trait;
use std::sync::Arc;

use wacore::types::events::Event;
use whatsapp_rust::bot::Bot;
use whatsapp_rust_sqlite_storage::SqliteStore;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

const SESSION_DB: &str = "session.db";

#[derive(Debug, Default)]
pub struct WhatsAppTransport;

impl WhatsAppTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionTransport for WhatsAppTransport {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    /// If already paired (session.db has credentials), reconnects silently.
    /// Otherwise a `PairingCode` event is emitted for display.
    async fn connect(self: Box<Self>, store: &SessionStore, events: EventSender) -> Result<SessionHandle, SessionError> {
        let db_path = store.file(SESSION_DB);

        let backend = SqliteStore::new(db_path.to_string_lossy().as_ref())
            .await
            .map_err(|e| SessionError::Transport(format!("failed to open session store: {}", e)))?;

        let chat = Arc::new(WhatsAppChat::new(events.downgrade()));
        let sent_cache = chat.clone();

        let mut bot = Bot::builder()
            .with_backend(Arc::new(backend))
            .with_transport_factory(TokioWebSocketTransportFactory::new())
            .with_http_client(UreqHttpClient::new())
            .on_event(move |event, _client| {
                let events = events.clone();
                let sent_cache = sent_cache.clone();
                async move {
                    for mapped in map_event(event, &sent_cache) {
                        if events.send(mapped).await.is_err() {
                            tracing::debug!("WhatsApp: event receiver gone");
                            break;
                        }
                    }
                }
            })
            .build()
            .await
            .map_err(|e| SessionError::Transport(format!("failed to build bot: {}", e)))?;

        chat.attach(bot.client());

        let running = bot
            .run()
            .await
            .map_err(|e| SessionError::Transport(format!("failed to start bot: {}", e)))?;

        // the bot only returns once it has given up reconnecting
        let task = tokio::spawn(async move {
            match running.await {
                Ok(()) => tracing::warn!("WhatsApp: session loop ended"),
                Err(e) => tracing::error!("WhatsApp: session task error: {:?}", e),
            }
            Err(SessionError::Closed)
        });

        tracing::info!("WhatsApp: session started ({})", db_path.display());
        let client: Arc<dyn crate::session::ChatClient> = chat;
        Ok(SessionHandle { client, task })
    }
}

fn map_event(event: Event, chat: &WhatsAppChat) -> Vec<SessionEvent> {
    match event {
        Event::PairingQrCode { code, .. } => vec![SessionEvent::PairingCode { code }],
        Event::PairSuccess(_) => vec![SessionEvent::Authenticated],
        Event::Connected(_) => vec![SessionEvent::Ready],
        Event::Message(msg, info) => vec![SessionEvent::MessageReceived(convert::inbound(&msg, &info))],
        Event::Receipt(receipt) => {
            let Some(status) = convert::ack_status(&receipt.r#type) else {
                return Vec::new();
            };
            receipt
                .message_ids
                .iter()
                .filter_map(|id| chat.advance(id, status))
                .map(|message| SessionEvent::DeliveryAck { message, status })
                .collect()
        }
        Event::LoggedOut(_) => vec![SessionEvent::LoggedOut],
        Event::Disconnected(_) => vec![SessionEvent::Disconnected],
        _ => Vec::new(),
    }
}
