//! Error types for session storage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("session storage lock poisoned")]
    Poisoned,
}

pub type SessionResult<T> = Result<T, SessionError>;
