//! Connection-scoped error taxonomy for the broker.
//!
//! Every variant here is fatal to exactly one connection; none of them
//! ever propagate to the listener or to other connections.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Decode(#[from] ripple_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] ripple_transport::TransportError),

    #[error("protocol misuse: {0}")]
    ProtocolMisuse(&'static str),
}
