//! chatrelay
//!
//! Relays direct chat messages from a messaging session to an HTTP chat
//! backend and sends the backend's reply back to the same chat.

pub mod config;
pub mod logging;
pub mod relay;
pub mod session;

#[cfg(feature = "whatsapp")]
pub mod whatsapp;

#[cfg(test)]
mod tests;

use crate::config::TransportKind;
use crate::session::{ConsoleTransport, SessionError, SessionTransport};

/// Build the transport selected in config.
pub fn build_transport(kind: TransportKind) -> Result<Box<dyn SessionTransport>, SessionError> {
    match kind {
        TransportKind::Console => Ok(Box::new(ConsoleTransport::stdio())),
        #[cfg(feature = "whatsapp")]
        TransportKind::Whatsapp => Ok(Box::new(whatsapp::WhatsAppTransport::new())),
        #[cfg(not(feature = "whatsapp"))]
        TransportKind::Whatsapp => Err(SessionError::Unsupported("whatsapp")),
    }
}
