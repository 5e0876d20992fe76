//! The broker's public surface: `start`/`stop`.

use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, info};

use ripple_transport::TransportWriter;

use crate::connection;
use crate::registry::Registry;
use crate::shutdown::Shutdown;

type Sender = TransportWriter<TcpStream>;

/// A long-lived broker service: the connection registry, the subscription
/// index, and the accept loop. Cheap to clone, since everything inside is
/// `Arc`'d, so `stop()` can be called from a different task than the one
/// running `start()`.
#[derive(Clone)]
pub struct Broker {
    registry: Arc<Registry<Sender>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            registry: Arc::new(Registry::new()),
            shutdown_tx,
        }
    }

    /// Bind `host:port` and serve connections until `stop()` is called.
    pub async fn start(&self, host: &str, port: u16) -> std::io::Result<()> {
        let listener = TcpListener::bind((host, port)).await?;
        info!(host, port, "broker listening");

        let mut stop_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (tcp, peer) = accepted?;
                    debug!(%peer, "accepted connection");

                    let registry = Arc::clone(&self.registry);
                    let conn_shutdown = Shutdown::new(self.shutdown_tx.subscribe());

                    tokio::spawn(async move {
                        connection::run_connection(tcp, registry, conn_shutdown).await;
                    });
                }
                _ = stop_rx.recv() => {
                    info!("broker shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Signal every live connection task and the accept loop to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
