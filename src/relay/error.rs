//! Relay error types.

/// Why a backend call did not produce a reply.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("request to backend timed out")]
    Timeout,

    #[error("could not reach backend: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend response has no usable 'response' field: {0}")]
    InvalidResponse(String),
}

impl RelayError {
    /// Transport-level failures share one user-facing fallback; a bad body
    /// gets another.
    pub fn is_invalid_response(&self) -> bool {
        matches!(self, RelayError::InvalidResponse(_))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout
        } else {
            RelayError::Transport(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
