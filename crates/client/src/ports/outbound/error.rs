//! Error types shared by the transport, channel and REST layers.

use baduk_protocol::{CoordinateError, FrameError};

/// Failures of the STOMP transport itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("WebSocket connection failed: {0}")]
    Connect(String),
    #[error("connection attempt timed out after {0}ms")]
    Timeout(u64),
    #[error("broker rejected the connection: {0}")]
    Rejected(String),
    #[error("invalid STOMP frame: {0}")]
    Frame(#[from] FrameError),
    #[error("connection closed")]
    Closed,
    #[error("not connected")]
    NotConnected,
}

/// Errors returned by channel operations.
///
/// Sending while disconnected is reported as [`ChannelError::NotConnected`];
/// the action is dropped and nothing is queued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("failed to connect: {0}")]
    ConnectFailed(TransportError),
    #[error("WebSocket is not connected")]
    NotConnected,
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),
    #[error("transport error: {0}")]
    Transport(TransportError),
    #[error("failed to serialize action: {0}")]
    Serialize(String),
}

/// Errors returned by the REST clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{action} failed: {message}")]
    RequestFailed {
        action: &'static str,
        message: String,
    },
    #[error("{action} failed with status {status}")]
    Status {
        action: &'static str,
        status: u16,
        body: String,
    },
    #[error("{action} returned an invalid response: {message}")]
    InvalidResponse {
        action: &'static str,
        message: String,
    },
}

impl ApiError {
    /// The server's error body, when the failure came from a non-2xx status.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
