//! Session error types.

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("messaging transport error: {0}")]
    Transport(String),

    #[error("failed to send to chat {chat}: {reason}")]
    Send { chat: String, reason: String },

    #[error("session closed")]
    Closed,

    #[error("transport '{0}' is not available in this build")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, SessionError>;
