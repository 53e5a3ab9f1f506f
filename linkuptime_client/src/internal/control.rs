use crate::ConnectionError;

/// Instructions sent from a [`Connection`](crate::Connection) to its task.
#[derive(Debug)]
pub enum ConnectionControlDetail {
    Send(String),
    /// Stop once everything queued before this has been written
    Close,
}

/// Things that happen on the socket, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Message(String),
    Error(ConnectionError),
}
