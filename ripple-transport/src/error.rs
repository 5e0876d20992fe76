//! Transport-level failures, distinct from `ripple_core::DecodeError`.
//!
//! Nothing here knows about MQTT; it is the WebSocket plumbing's own error
//! surface, exposed so the broker and client can tell a severed connection
//! apart from a malformed packet.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("received a text frame; only binary frames carry control packets")]
    TextFrame,

    #[error("connection closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
