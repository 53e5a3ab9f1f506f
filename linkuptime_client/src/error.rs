use thiserror::Error;
use tokio::sync::mpsc::error::{SendError, TrySendError};

/// An error that might occur on the client connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Connection closed")]
    Closed,
    #[error("I/O Error: {0}")]
    IoError(String),
    #[error("Invalid server name for TLS: {0}")]
    InvalidServerName(String),
    #[error("Send queue full")]
    SendQueueFull,
}

impl From<std::io::Error> for ConnectionError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

impl<T> From<TrySendError<T>> for ConnectionError {
    fn from(e: TrySendError<T>) -> Self {
        match e {
            TrySendError::Full(_) => Self::SendQueueFull,
            TrySendError::Closed(_) => Self::Closed,
        }
    }
}

impl<T> From<SendError<T>> for ConnectionError {
    fn from(_: SendError<T>) -> Self {
        Self::Closed
    }
}
