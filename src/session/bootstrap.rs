//! Session Bootstrap
//!
//! Opens the session store, connects the transport, and dispatches its events
//! strictly one at a time: each handler runs to completion (including the
//! backend round-trip and the reply) before the next event is received.

use super::error::{Result, SessionError};
use super::events::{AckStatus, InboundMessage, OutboundMessage, SessionEvent};
use super::pairing::render_qr;
use super::store::SessionStore;
use super::transport::{SessionHandle, SessionTransport};
use crate::config::Config;
use crate::logging::preview;
use crate::relay::{HandleOutcome, MessageHandler, Relay};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Events buffered between the transport and the dispatcher.
const EVENT_BUFFER: usize = 64;

pub struct SessionBootstrap {
    config: Arc<Config>,
    relay: Arc<dyn Relay>,
    transport: Box<dyn SessionTransport>,
}

impl SessionBootstrap {
    pub fn new(config: Arc<Config>, relay: Arc<dyn Relay>, transport: Box<dyn SessionTransport>) -> Self {
        Self {
            config,
            relay,
            transport,
        }
    }

    /// Run until the transport closes, its session task ends, or Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Session: could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until the transport closes or `shutdown` resolves.
    ///
    /// Errors when the session cannot be opened or connected, or when the
    /// transport's session task dies. Events already buffered when the task
    /// ends are still dispatched.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let session = &self.config.session;
        let store = SessionStore::open(&session.path, &session.client_id)?;
        tracing::info!(
            "Session: starting {} transport (store {}, existing credentials: {})",
            self.transport.name(),
            store.dir().display(),
            store.has_credentials()
        );

        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let SessionHandle { client, mut task } = self.transport.connect(&store, tx).await?;

        let handler = MessageHandler::new(self.relay.clone(), client, self.config.bot.test_command.clone());
        let dispatcher = Dispatcher::new(handler, self.relay, self.config.bot.self_test_text.clone());

        tokio::pin!(shutdown);
        let mut outcome = None;

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => {
                        tracing::trace!("Session: event {}", event.kind());
                        dispatcher.dispatch(event).await;
                    }
                    None => {
                        tracing::info!("Session: event stream closed");
                        break;
                    }
                },
                joined = &mut task, if outcome.is_none() => {
                    let result = match joined {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(e)) => {
                            tracing::error!("Session: transport stopped: {}", e);
                            Err(e)
                        }
                        Err(e) => {
                            tracing::error!("Session: transport task failed: {}", e);
                            Err(SessionError::Transport(format!("session task failed: {}", e)))
                        }
                    };
                    outcome = Some(result);
                    // no new events; drain what is already queued
                    rx.close();
                }
                _ = &mut shutdown => {
                    tracing::info!("Session: shutdown requested");
                    break;
                }
            }
        }

        task.abort();
        outcome.unwrap_or(Ok(()))
    }
}

/// Routes each event kind to its handler.
pub struct Dispatcher {
    handler: MessageHandler,
    relay: Arc<dyn Relay>,
    self_test_text: String,
}

impl Dispatcher {
    pub fn new(handler: MessageHandler, relay: Arc<dyn Relay>, self_test_text: impl Into<String>) -> Self {
        Self {
            handler,
            relay,
            self_test_text: self_test_text.into(),
        }
    }

    pub async fn dispatch(&self, event: SessionEvent) {
        match event {
            SessionEvent::PairingCode { code } => on_pairing_code(&code),
            SessionEvent::Authenticated => tracing::info!("Session: authenticated"),
            SessionEvent::Ready => {
                self.on_ready().await;
            }
            SessionEvent::MessageReceived(msg) => {
                self.on_message(&msg).await;
            }
            SessionEvent::MessageCreated(msg) => on_message_created(&msg),
            SessionEvent::DeliveryAck { message, status } => on_delivery_ack(&message, status),
            SessionEvent::Disconnected => tracing::warn!("Session: disconnected"),
            SessionEvent::LoggedOut => tracing::warn!("Session: logged out, pairing will be required"),
        }
    }

    /// Self-test through the relay. The result is only logged.
    pub async fn on_ready(&self) -> String {
        tracing::info!("Session: connected and ready");
        tracing::info!("Session: testing backend with {:?}", self.self_test_text);
        let reply = self.relay.relay(&self.self_test_text).await;
        tracing::info!("Session: self-test result: {:?}", preview(&reply, 80));
        reply
    }

    pub async fn on_message(&self, msg: &InboundMessage) -> HandleOutcome {
        let outcome = self.handler.handle_message(msg).await;
        tracing::debug!("Session: message {} -> {:?}", msg.id, outcome);
        outcome
    }
}

fn on_pairing_code(code: &str) {
    tracing::info!("Session: pairing required, scan the QR code with WhatsApp");
    match render_qr(code) {
        Ok(art) => println!("\n{}\n", art),
        Err(e) => {
            tracing::warn!("Session: could not render QR ({}), raw code follows", e);
            println!("{}", code);
        }
    }
}

fn on_message_created(msg: &OutboundMessage) {
    if msg.text.is_empty() {
        return;
    }
    tracing::info!(
        "Session: bot created message {} in {}: {:?}",
        msg.id,
        msg.chat,
        preview(&msg.text, 50)
    );
}

fn on_delivery_ack(msg: &OutboundMessage, status: AckStatus) {
    if msg.text.is_empty() {
        return;
    }
    tracing::info!(
        "Session: message {} {} (ack={}): {:?}",
        msg.id,
        status,
        status.code(),
        preview(&msg.text, 50)
    );
}
