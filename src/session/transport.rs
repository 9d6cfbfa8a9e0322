//! Seams to the external messaging library.
//!
//! A `SessionTransport` owns the connection and pushes `SessionEvent`s into a
//! channel; the `ChatClient` it hands back is how replies get out.

use super::error::Result;
use super::events::{InboundMessage, OutboundMessage, SessionEvent};
use super::store::SessionStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending half of the event stream a transport writes into.
pub type EventSender = mpsc::Sender<SessionEvent>;

/// Outbound operations on a live session.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Reply in the chat `to` came from, quoting it where the network supports it.
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<OutboundMessage>;

    /// Show the "composing" indicator in `chat`.
    async fn send_typing(&self, chat: &str) -> Result<()>;
}

/// A connected session: the reply client plus the task driving the connection.
pub struct SessionHandle {
    pub client: Arc<dyn ChatClient>,
    /// `Ok` when the session finished on its own terms (console input closed),
    /// `Err` when the connection died underneath it.
    pub task: JoinHandle<Result<()>>,
}

#[async_trait]
pub trait SessionTransport: Send {
    fn name(&self) -> &'static str;

    /// Start (or restore) the session. Errors here are fatal to the process.
    async fn connect(self: Box<Self>, store: &SessionStore, events: EventSender) -> Result<SessionHandle>;
}
