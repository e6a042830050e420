//! Room registry with a forward and a reverse index.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Tracks which connections sit in which rooms.
///
/// Keeps a reverse index per connection so a disconnect can leave every
/// room in one pass. Empty rooms are dropped eagerly.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name to member connections.
    members: DashMap<String, HashSet<ConnectionId>>,
    /// Connection to joined rooms.
    joined: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room.
    pub fn join(&self, room: &str, conn_id: ConnectionId) {
        self.members
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
        self.joined
            .entry(conn_id)
            .or_default()
            .insert(room.to_string());
    }

    /// Remove a connection from a room.
    pub fn leave(&self, room: &str, conn_id: ConnectionId) {
        if let Some(mut members) = self.members.get_mut(room) {
            members.remove(&conn_id);
            if members.is_empty() {
                drop(members);
                self.members.remove(room);
            }
        }
        if let Some(mut joined) = self.joined.get_mut(&conn_id) {
            joined.remove(room);
        }
    }

    /// Remove a connection from every room it joined.
    pub fn leave_all(&self, conn_id: ConnectionId) {
        let rooms = self
            .joined
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default();
        for room in &rooms {
            if let Some(mut members) = self.members.get_mut(room) {
                members.remove(&conn_id);
                if members.is_empty() {
                    drop(members);
                    self.members.remove(room);
                }
            }
        }
    }

    /// Member connections of a room.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.members
            .get(room)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Rooms a connection has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.joined
            .get(&conn_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_join_and_leave() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();

        registry.join("batch:2024", conn);
        assert_eq!(registry.members("batch:2024"), vec![conn]);

        registry.leave("batch:2024", conn);
        assert!(registry.members("batch:2024").is_empty());
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_leave_all_clears_reverse_index() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let other = Uuid::new_v4();

        registry.join("course:gnm", conn);
        registry.join("batch:2024", conn);
        registry.join("course:gnm", other);

        registry.leave_all(conn);
        assert!(registry.rooms_of(conn).is_empty());
        assert_eq!(registry.members("course:gnm"), vec![other]);
        assert!(registry.members("batch:2024").is_empty());
    }

    #[test]
    fn test_members_of_unknown_room_is_empty() {
        let registry = RoomRegistry::new();
        assert!(registry.members("role:faculty").is_empty());
    }
}
