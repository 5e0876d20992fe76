//! Client-visible error taxonomy: local encoding/transport errors surface
//! synchronously to the caller; remote protocol errors manifest only as
//! a closed connection.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] ripple_transport::TransportError),

    #[error("codec error: {0}")]
    Decode(#[from] ripple_core::Error),

    #[error("broker refused the connection (reason code {0:#04x})")]
    ConnectionRefused(u8),

    #[error("not connected")]
    NotConnected,

    #[error("disconnected")]
    Disconnected,

    #[error("timed out waiting for the broker")]
    Timeout,

    #[error("connection closed")]
    Closed,

    #[error("protocol error: {0}")]
    Protocol(&'static str),
}

pub type Result<T> = std::result::Result<T, ClientError>;
