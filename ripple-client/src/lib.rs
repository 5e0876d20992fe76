//! A small asynchronous client engine for the broker's WebSocket-framed
//! MQTT subset: connect, subscribe with a callback, publish, unsubscribe,
//! disconnect.

mod engine;
mod error;
mod options;
mod payload;

pub use engine::ClientEngine;
pub use error::{ClientError, Result};
pub use options::ConnectOptions;
pub use payload::Payload;
pub use ripple_core::properties::PublishProperties;
