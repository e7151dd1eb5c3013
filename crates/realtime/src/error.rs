use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("channel endpoint unavailable: {0}")]
    Unavailable(String),
}

pub type ChannelResult<T> = Result<T, ChannelError>;
