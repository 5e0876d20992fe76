//! Listens for the server shutdown signal.
//!
//! One of these is handed to every per-connection task. A `broadcast`
//! channel rather than a plain `Notify` because `stop()` must reach every
//! live connection, not just the next one to poll.

use tokio::sync::broadcast;

pub struct Shutdown {
    is_shutdown: bool,
    notify: broadcast::Receiver<()>,
}

impl Shutdown {
    pub fn new(notify: broadcast::Receiver<()>) -> Self {
        Self {
            is_shutdown: false,
            notify,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown
    }

    /// Resolves once the shutdown signal has fired. Safe to call more than
    /// once: it returns immediately on every call after the first.
    pub async fn recv(&mut self) {
        if self.is_shutdown {
            return;
        }

        let _ = self.notify.recv().await;
        self.is_shutdown = true;
    }
}
