//! Process-wide registry of live notification channels, keyed by user id.
//! Multiple connections per user are permitted; each holds the sending half
//! of an unbounded channel drained by that connection's socket task.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

struct Connection {
    id: Uuid,
    tx: UnboundedSender<String>,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<Uuid, Vec<Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection for a user and returns its id for later removal.
    pub async fn register(&self, user_id: Uuid, tx: UnboundedSender<String>) -> Uuid {
        let connection_id = Uuid::new_v4();
        let mut connections = self.connections.write().await;
        connections
            .entry(user_id)
            .or_default()
            .push(Connection {
                id: connection_id,
                tx,
            });
        connection_id
    }

    /// Removes one connection; the user's entry is dropped once empty.
    pub async fn unregister(&self, user_id: Uuid, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if let Some(list) = connections.get_mut(&user_id) {
            list.retain(|c| c.id != connection_id);
            if list.is_empty() {
                connections.remove(&user_id);
            }
        }
    }

    /// Best-effort push to every live connection of one user. Send failures
    /// (a socket task that already exited) are ignored; returns how many
    /// sends were accepted.
    pub async fn push_to(&self, user_id: Uuid, payload: &str) -> usize {
        let connections = self.connections.read().await;
        let Some(list) = connections.get(&user_id) else {
            return 0;
        };
        list.iter()
            .filter(|c| c.tx.send(payload.to_string()).is_ok())
            .count()
    }

    /// Best-effort push to every connection of every user.
    pub async fn broadcast(&self, payload: &str) -> usize {
        let connections = self.connections.read().await;
        connections
            .values()
            .flatten()
            .filter(|c| c.tx.send(payload.to_string()).is_ok())
            .count()
    }

    pub async fn connection_count(&self, user_id: Uuid) -> usize {
        self.connections
            .read()
            .await
            .get(&user_id)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn test_push_reaches_registered_connection() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let (tx, mut rx) = unbounded_channel();

        registry.register(user, tx).await;
        let delivered = registry.push_to(user, "hello").await;

        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_push_to_unknown_user_is_noop() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.push_to(Uuid::new_v4(), "hello").await, 0);
    }

    #[tokio::test]
    async fn test_multiple_connections_per_user_all_receive() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();

        registry.register(user, tx1).await;
        registry.register(user, tx2).await;
        assert_eq!(registry.push_to(user, "ping").await, 2);
        assert_eq!(rx1.recv().await.as_deref(), Some("ping"));
        assert_eq!(rx2.recv().await.as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn test_unregister_removes_only_that_connection() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let (tx1, _rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();

        let first = registry.register(user, tx1).await;
        registry.register(user, tx2).await;
        registry.unregister(user, first).await;

        assert_eq!(registry.connection_count(user).await, 1);
        assert_eq!(registry.push_to(user, "still here").await, 1);
        assert_eq!(rx2.recv().await.as_deref(), Some("still here"));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let registry = ConnectionRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();

        registry.register(alice, tx_a).await;
        registry.register(bob, tx_b).await;
        registry.push_to(alice, "for alice").await;

        assert_eq!(rx_a.recv().await.as_deref(), Some("for alice"));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dead_connection_send_is_swallowed() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let (tx, rx) = unbounded_channel();
        drop(rx); // receiver gone: sends will fail

        registry.register(user, tx).await;
        assert_eq!(registry.push_to(user, "lost").await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_everyone() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();

        registry.register(Uuid::new_v4(), tx_a).await;
        registry.register(Uuid::new_v4(), tx_b).await;
        assert_eq!(registry.broadcast("all hands").await, 2);
        assert_eq!(rx_a.recv().await.as_deref(), Some("all hands"));
        assert_eq!(rx_b.recv().await.as_deref(), Some("all hands"));
    }
}
