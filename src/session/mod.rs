//! Session Bootstrap
//!
//! Establishes (or restores) the messaging session, surfaces its lifecycle
//! and message events, and feeds them to the relay one at a time.

mod bootstrap;
mod console;
mod error;
mod events;
mod pairing;
mod store;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{Dispatcher, SessionBootstrap};
pub use console::{CONSOLE_CONTACT, ConsoleTransport};
pub use error::SessionError;
pub use events::{AckStatus, InboundMessage, OutboundMessage, SessionEvent};
pub use pairing::render_qr;
pub use store::SessionStore;
pub use transport::{ChatClient, EventSender, SessionHandle, SessionTransport};
