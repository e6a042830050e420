//! Connection pool indexed by identity and by connection ID.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all live connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// Identity to its open connections.
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID to handle, for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Remove a connection, returning its handle if it was present.
    pub fn remove(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(&conn_id)?;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != conn_id);
            if connections.is_empty() {
                drop(connections);
                self.by_user.remove(&handle.user_id);
            }
        }
        Some(handle)
    }

    /// All open connections of one identity.
    pub fn user_connections(&self, user_id: Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Look up a connection by ID.
    pub fn get(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(&conn_id).map(|entry| entry.value().clone())
    }

    /// Total live connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Distinct identities with at least one connection.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Drain every connection, marking each dead.
    pub fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let handles: Vec<Arc<ConnectionHandle>> = self
            .by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.by_id.clear();
        self.by_user.clear();
        for handle in &handles {
            handle.mark_dead();
        }
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use nightingale_entity::user::UserRole;

    fn handle(user_id: Uuid) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(ConnectionHandle::new(user_id, UserRole::Student, tx))
    }

    #[test]
    fn test_one_identity_many_connections() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();
        let a = handle(user);
        let b = handle(user);
        pool.add(a.clone());
        pool.add(b.clone());

        assert_eq!(pool.connection_count(), 2);
        assert_eq!(pool.user_count(), 1);
        assert_eq!(pool.user_connections(user).len(), 2);

        pool.remove(a.id);
        assert_eq!(pool.user_connections(user).len(), 1);
        pool.remove(b.id);
        assert_eq!(pool.user_count(), 0);
    }

    #[test]
    fn test_drain_marks_dead() {
        let pool = ConnectionPool::new();
        let h = handle(Uuid::new_v4());
        pool.add(h.clone());

        let drained = pool.drain();
        assert_eq!(drained.len(), 1);
        assert!(!h.is_alive());
        assert_eq!(pool.connection_count(), 0);
    }
}
