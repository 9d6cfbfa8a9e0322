//! Console transport
//!
//! Each input line is a direct message from a single local contact; replies
//! are written to the output. Handy for exercising a backend without pairing
//! a phone.

use super::error::{Result, SessionError};
use super::events::{AckStatus, InboundMessage, OutboundMessage, SessionEvent};
use super::store::SessionStore;
use super::transport::{ChatClient, EventSender, SessionHandle, SessionTransport};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, mpsc};

/// Sender id used for console messages.
pub const CONSOLE_CONTACT: &str = "console";

pub struct ConsoleTransport<R, W> {
    input: R,
    output: W,
}

impl ConsoleTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()),
            output: tokio::io::stdout(),
        }
    }
}

impl<R, W> ConsoleTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

#[async_trait]
impl<R, W> SessionTransport for ConsoleTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn name(&self) -> &'static str {
        "console"
    }

    async fn connect(self: Box<Self>, store: &SessionStore, events: EventSender) -> Result<SessionHandle> {
        tracing::info!(
            "Session: console transport for client '{}' (store {})",
            store.client_id(),
            store.dir().display()
        );

        let ConsoleTransport { input, output } = *self;

        let client = Arc::new(ConsoleChat {
            output: Mutex::new(output),
            events: events.downgrade(),
        });

        events.send(SessionEvent::Authenticated).await.map_err(|_| SessionError::Closed)?;
        events.send(SessionEvent::Ready).await.map_err(|_| SessionError::Closed)?;

        let task = tokio::spawn(async move {
            let mut lines = input.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let msg = InboundMessage::direct(CONSOLE_CONTACT, line);
                        if events.send(SessionEvent::MessageReceived(msg)).await.is_err() {
                            tracing::debug!("Session: event receiver gone, stopping console reader");
                            return Ok(());
                        }
                    }
                    Ok(None) => {
                        tracing::info!("Session: console input closed");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::error!("Session: console read error: {}", e);
                        return Err(SessionError::Io(e));
                    }
                }
            }
        });

        Ok(SessionHandle { client, task })
    }
}

/// Writes replies as `bot> <text>` lines.
///
/// Holds only a weak sender: the stream must close once the input ends.
struct ConsoleChat<W> {
    output: Mutex<W>,
    events: mpsc::WeakSender<SessionEvent>,
}

impl<W> ConsoleChat<W> {
    fn notify(&self, event: SessionEvent) {
        let Some(events) = self.events.upgrade() else {
            tracing::debug!("Session: event stream closed, dropping {}", event.kind());
            return;
        };
        if let Err(e) = events.try_send(event) {
            tracing::debug!("Session: dropped console lifecycle event: {}", e);
        }
    }
}

#[async_trait]
impl<W> ChatClient for ConsoleChat<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<OutboundMessage> {
        let send_err = |e: std::io::Error| SessionError::Send {
            chat: to.chat.clone(),
            reason: e.to_string(),
        };

        {
            let mut out = self.output.lock().await;
            out.write_all(format!("bot> {}\n", text).as_bytes())
                .await
                .map_err(send_err)?;
            out.flush().await.map_err(send_err)?;
        }

        let sent = OutboundMessage {
            id: uuid::Uuid::new_v4().to_string(),
            chat: to.chat.clone(),
            text: text.to_string(),
            timestamp: chrono::Utc::now(),
        };

        self.notify(SessionEvent::MessageCreated(sent.clone()));
        self.notify(SessionEvent::DeliveryAck {
            message: sent.clone(),
            status: AckStatus::Sent,
        });

        Ok(sent)
    }

    async fn send_typing(&self, chat: &str) -> Result<()> {
        tracing::debug!("Session: {} is composing", chat);
        Ok(())
    }
}
