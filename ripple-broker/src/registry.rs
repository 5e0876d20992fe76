//! The broker's shared state: the `client_id` registry and the
//! subscription index, guarded by a single mutex held only across pure
//! in-memory mutation, never across an `.await`.
//!
//! Generic over the sender handle `W` so the registry's set semantics
//! and cleanup-on-disconnect semantics can be exercised in unit tests
//! without a real WebSocket transport; `ripple-broker`'s connection
//! handling instantiates it as `Registry<TransportWriter<TcpStream>>`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Opaque per-connection identifier, assigned on accept and stable for the
/// connection's lifetime. Not the `client_id`: a connection may hold a
/// sender handle before (and even without) ever completing CONNECT.
pub type ConnId = u64;

struct Inner<W> {
    clients: HashMap<String, ConnId>,
    subscriptions: HashMap<String, HashSet<ConnId>>,
    senders: HashMap<ConnId, W>,
}

impl<W> Default for Inner<W> {
    fn default() -> Self {
        Self {
            clients: HashMap::new(),
            subscriptions: HashMap::new(),
            senders: HashMap::new(),
        }
    }
}

pub struct Registry<W> {
    inner: Mutex<Inner<W>>,
    next_id: AtomicU64,
}

impl<W> Default for Registry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Registry<W> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<W: Clone> Registry<W> {
    /// Assigns a fresh connection id and records its sender handle. Called
    /// once per accepted transport, before any packet is processed.
    pub fn register_connection(&self, sender: W) -> ConnId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().unwrap().senders.insert(id, sender);
        id
    }

    /// CONNECT: bind `client_id` to this connection. A second CONNECT on
    /// the same socket is rejected by the caller before this is reached,
    /// so this always succeeds, overwriting any prior owner of the same
    /// `client_id` (there is no persistent-session takeover handling).
    pub fn bind_client(&self, conn: ConnId, client_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .clients
            .insert(client_id.to_string(), conn);
    }

    /// SUBSCRIBE: idempotent insert into `subscriptions[topic]`.
    pub fn subscribe(&self, conn: ConnId, topic: &str) {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .entry(topic.to_string())
            .or_default()
            .insert(conn);
    }

    /// UNSUBSCRIBE: remove this connection from `topic`'s set, dropping the
    /// key entirely once it is empty.
    pub fn unsubscribe(&self, conn: ConnId, topic: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(set) = inner.subscriptions.get_mut(topic) {
            set.remove(&conn);
            if set.is_empty() {
                inner.subscriptions.remove(topic);
            }
        }
    }

    /// Snapshot the current subscriber senders for `topic`. The lock is
    /// released before the caller ever sends a frame.
    pub fn subscribers(&self, topic: &str) -> Vec<W> {
        let inner = self.inner.lock().unwrap();
        match inner.subscriptions.get(topic) {
            Some(conns) => conns
                .iter()
                .filter_map(|id| inner.senders.get(id).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Tears down every trace of `conn`: its subscriptions in every topic,
    /// its `client_id` binding if any, and its sender handle. Called once
    /// on DISCONNECT, transport close, or decode error.
    pub fn remove_connection(&self, conn: ConnId) {
        let mut inner = self.inner.lock().unwrap();
        inner.subscriptions.retain(|_, conns| {
            conns.remove(&conn);
            !conns.is_empty()
        });
        inner.clients.retain(|_, id| *id != conn);
        inner.senders.remove(&conn);
    }

    #[cfg(test)]
    fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .get(topic)
            .map_or(0, |s| s.len())
    }

    #[cfg(test)]
    fn has_client(&self, client_id: &str) -> bool {
        self.inner.lock().unwrap().clients.contains_key(client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_subscribe_is_idempotent() {
        let registry: Registry<u32> = Registry::new();
        let conn = registry.register_connection(1);

        registry.subscribe(conn, "t");
        registry.subscribe(conn, "t");
        registry.subscribe(conn, "t");

        assert_eq!(registry.subscriber_count("t"), 1);

        registry.unsubscribe(conn, "t");
        assert_eq!(registry.subscriber_count("t"), 0);
    }

    #[test]
    fn empty_topic_is_removed_after_last_unsubscribe() {
        let registry: Registry<u32> = Registry::new();
        let a = registry.register_connection(1);
        let b = registry.register_connection(2);

        registry.subscribe(a, "t");
        registry.subscribe(b, "t");
        assert_eq!(registry.subscriber_count("t"), 2);

        registry.unsubscribe(a, "t");
        assert_eq!(registry.subscriber_count("t"), 1);

        registry.unsubscribe(b, "t");
        assert_eq!(registry.subscriber_count("t"), 0);
        assert!(registry.subscribers("t").is_empty());
    }

    #[test]
    fn disconnect_cleans_up_subscriptions_and_client_binding() {
        let registry: Registry<u32> = Registry::new();
        let conn = registry.register_connection(42);

        registry.bind_client(conn, "client-a");
        registry.subscribe(conn, "t1");
        registry.subscribe(conn, "t2");

        registry.remove_connection(conn);

        assert!(!registry.has_client("client-a"));
        assert_eq!(registry.subscriber_count("t1"), 0);
        assert_eq!(registry.subscriber_count("t2"), 0);
    }

    #[test]
    fn disconnect_does_not_affect_other_subscribers() {
        let registry: Registry<u32> = Registry::new();
        let a = registry.register_connection(1);
        let b = registry.register_connection(2);

        registry.subscribe(a, "t");
        registry.subscribe(b, "t");

        registry.remove_connection(a);

        assert_eq!(registry.subscribers("t"), vec![2]);
    }

    #[test]
    fn fan_out_snapshot_reflects_current_subscribers_only() {
        let registry: Registry<u32> = Registry::new();
        let a = registry.register_connection(10);
        let b = registry.register_connection(20);

        registry.subscribe(a, "t");
        let snapshot_before = registry.subscribers("t");
        assert_eq!(snapshot_before, vec![10]);

        registry.subscribe(b, "t");
        let snapshot_after = registry.subscribers("t");
        assert_eq!(snapshot_after.len(), 2);
    }
}
