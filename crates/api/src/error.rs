//! Error types for the REST client.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Server { status: StatusCode, message: String },

    /// 401/403. Callers redirect to the sign-in route instead of showing it.
    #[error("not authorised: {0}")]
    Unauthorized(String),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no {0} stored for this request")]
    MissingToken(&'static str),

    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::MissingToken(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Transport(error) => error.status(),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
