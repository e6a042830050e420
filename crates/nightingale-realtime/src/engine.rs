//! Top-level live-session engine.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

use nightingale_core::config::RealtimeConfig;
use nightingale_core::error::AppError;
use nightingale_core::events::NotificationCreated;
use nightingale_core::result::AppResult;
use nightingale_core::traits::Broadcaster;
use nightingale_entity::student::Student;
use nightingale_entity::user::UserRole;

use crate::channel::registry::RoomRegistry;
use crate::channel::rooms;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::OutboundMessage;

/// Coordinates the connection pool and room registry, and fans events
/// out to live sessions.
#[derive(Clone)]
pub struct RealtimeEngine {
    pool: Arc<ConnectionPool>,
    rooms: Arc<RoomRegistry>,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.pool.connection_count())
            .field("rooms", &self.rooms.room_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Create a new engine.
    pub fn new(config: RealtimeConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        info!("Real-time engine initialized");
        Self {
            pool: Arc::new(ConnectionPool::new()),
            rooms: Arc::new(RoomRegistry::new()),
            config,
            shutdown_tx,
        }
    }

    /// Engine configuration (ping interval etc. for socket handlers).
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Register an authenticated session. Auto-joins the session to its
    /// identity/role rooms (and course/batch rooms for students) and
    /// returns the handle plus the receiver the socket task drains.
    pub fn connect(
        &self,
        user_id: Uuid,
        role: UserRole,
        student: Option<&Student>,
    ) -> AppResult<(Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>)> {
        let open = self.pool.user_connections(user_id).len();
        if open >= self.config.max_connections_per_user {
            return Err(AppError::conflict("Connection limit reached for this user"));
        }

        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, role, tx));
        self.pool.add(handle.clone());

        for room in rooms::default_rooms(user_id, role, student) {
            self.rooms.join(&room, handle.id);
        }

        debug!(connection_id = %handle.id, user_id = %user_id, "session connected");
        Ok((handle, rx))
    }

    /// Tear down a session: leave every room and drop the handle.
    pub fn disconnect(&self, conn_id: ConnectionId) {
        self.rooms.leave_all(conn_id);
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            debug!(connection_id = %conn_id, user_id = %handle.user_id, "session disconnected");
        }
    }

    /// Join a room on behalf of a session, subject to the room policy.
    pub fn subscribe(&self, handle: &ConnectionHandle, room: &str) -> AppResult<()> {
        if !rooms::can_join(handle.user_id, handle.role, room) {
            return Err(AppError::forbidden("Not allowed to join this room"));
        }
        self.rooms.join(room, handle.id);
        Ok(())
    }

    /// Leave a room on behalf of a session.
    pub fn unsubscribe(&self, handle: &ConnectionHandle, room: &str) {
        self.rooms.leave(room, handle.id);
    }

    /// Live connection count, surfaced on the health endpoint.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Receiver for shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every socket task to stop and drop all sessions.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        let drained = self.pool.drain();
        for handle in &drained {
            self.rooms.leave_all(handle.id);
        }
        info!(connections = drained.len(), "real-time engine shut down");
    }

    fn deliver(&self, handles: &[Arc<ConnectionHandle>], event: &NotificationCreated) -> usize {
        let mut delivered = 0;
        for handle in handles {
            if handle.send(OutboundMessage::from(event)) {
                delivered += 1;
            }
        }
        delivered
    }
}

#[async_trait]
impl Broadcaster for RealtimeEngine {
    async fn emit_to_identity(&self, user_id: Uuid, event: &NotificationCreated) {
        let handles = self.pool.user_connections(user_id);
        if handles.is_empty() {
            return;
        }
        let delivered = self.deliver(&handles, event);
        debug!(user_id = %user_id, delivered, "event emitted to identity sessions");
    }

    async fn emit_to_room(&self, room: &str, event: &NotificationCreated) {
        let handles: Vec<Arc<ConnectionHandle>> = self
            .rooms
            .members(room)
            .into_iter()
            .filter_map(|conn_id| self.pool.get(conn_id))
            .collect();
        if handles.is_empty() {
            return;
        }
        let delivered = self.deliver(&handles, event);
        debug!(room, delivered, "event emitted to room");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn engine() -> RealtimeEngine {
        RealtimeEngine::new(RealtimeConfig::default())
    }

    fn event() -> NotificationCreated {
        NotificationCreated {
            id: Uuid::new_v4(),
            title: "t".into(),
            message: "m".into(),
            kind: "info".into(),
            category: "General".into(),
            priority: "medium".into(),
            created_at: Utc::now(),
            sender: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_identity_emit_reaches_every_session() {
        let engine = engine();
        let user = Uuid::new_v4();
        let (_h1, mut rx1) = engine.connect(user, UserRole::Student, None).unwrap();
        let (_h2, mut rx2) = engine.connect(user, UserRole::Student, None).unwrap();

        engine.emit_to_identity(user, &event()).await;

        assert!(matches!(
            rx1.try_recv(),
            Ok(OutboundMessage::Notification { .. })
        ));
        assert!(matches!(
            rx2.try_recv(),
            Ok(OutboundMessage::Notification { .. })
        ));
    }

    #[tokio::test]
    async fn test_offline_identity_absorbs_event() {
        // Must not panic or error.
        engine().emit_to_identity(Uuid::new_v4(), &event()).await;
    }

    #[tokio::test]
    async fn test_room_emit_reaches_members_only() {
        let engine = engine();
        let (admin, mut admin_rx) = engine
            .connect(Uuid::new_v4(), UserRole::Admin, None)
            .unwrap();
        let (_student, mut student_rx) = engine
            .connect(Uuid::new_v4(), UserRole::Student, None)
            .unwrap();

        engine
            .emit_to_room(rooms::ADMIN_NOTIFICATIONS, &event())
            .await;

        assert!(matches!(
            admin_rx.try_recv(),
            Ok(OutboundMessage::Notification { .. })
        ));
        assert!(student_rx.try_recv().is_err());
        drop(admin);
    }

    #[tokio::test]
    async fn test_connection_limit_enforced() {
        let engine = engine();
        let user = Uuid::new_v4();
        let mut held = Vec::new();
        for _ in 0..engine.config().max_connections_per_user {
            held.push(engine.connect(user, UserRole::Student, None).unwrap());
        }
        assert!(engine.connect(user, UserRole::Student, None).is_err());
    }

    #[tokio::test]
    async fn test_disconnect_leaves_all_rooms() {
        let engine = engine();
        let (handle, _rx) = engine
            .connect(Uuid::new_v4(), UserRole::Admin, None)
            .unwrap();
        assert!(!engine.rooms.members(rooms::ADMIN_NOTIFICATIONS).is_empty());

        engine.disconnect(handle.id);
        assert!(engine.rooms.members(rooms::ADMIN_NOTIFICATIONS).is_empty());
        assert_eq!(engine.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_student_cannot_join_admin_room() {
        let engine = engine();
        let (handle, _rx) = engine
            .connect(Uuid::new_v4(), UserRole::Student, None)
            .unwrap();
        assert!(engine
            .subscribe(&handle, rooms::ADMIN_NOTIFICATIONS)
            .is_err());
        assert!(engine.subscribe(&handle, "course:gnm").is_ok());
    }
}
