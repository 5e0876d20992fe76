//! Error types for the packet codec.

use thiserror::Error;

/// Anything that can go wrong turning bytes into a packet.
///
/// Every variant is fatal to the frame being decoded; there is no
/// "need more data" case because a WebSocket binary frame always carries
/// exactly one whole packet (see the transport adapter).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer ended before a complete field could be read")]
    UnexpectedEof,

    #[error("string field was not valid UTF-8")]
    InvalidUtf8,

    #[error("variable byte integer uses more than 4 bytes")]
    VarIntTooLarge,

    #[error("remaining length did not match the bytes available in the frame")]
    LengthMismatch,

    #[error("unsupported control packet type {0:#04x}")]
    UnsupportedPacketType(u8),

    #[error("unknown property identifier {0:#04x}")]
    UnknownProperty(u8),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
