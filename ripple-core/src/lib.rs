//! Wire codec for the broker's MQTT-5 packet subset.
//!
//! This crate is pure and synchronous: it turns byte slices into typed
//! packets and back, and knows nothing about sockets or WebSocket framing.

pub mod codec;
pub mod error;
pub mod packets;
pub mod properties;
pub mod topic;

pub use error::{DecodeError, Error};

pub type Result<T> = std::result::Result<T, Error>;
