//! WhatsApp Integration
//!
//! Drives a WhatsApp Web multi-device session via `whatsapp-rust` and maps its
//! events onto `SessionEvent`s. Credentials live in `session.db` inside the
//! session store, so restarts reconnect without pairing again.

mod agent;
mod client;
mod convert;

pub use agent::WhatsAppTransport;
