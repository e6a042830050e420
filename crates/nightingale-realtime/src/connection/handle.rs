//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use nightingale_entity::user::UserRole;

use crate::message::OutboundMessage;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single live WebSocket connection.
///
/// Holds the sender half for pushing messages to the client plus the
/// identity the connection authenticated as. One identity can hold
/// several handles at once (multiple tabs/devices).
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Identity that owns this connection.
    pub user_id: Uuid,
    /// Role, cached for room-join checks.
    pub role: UserRole,
    /// Sender for outbound messages.
    pub sender: mpsc::Sender<OutboundMessage>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(user_id: Uuid, role: UserRole, sender: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Push a message to this connection without blocking.
    ///
    /// A full buffer drops the message (the client will catch up from
    /// the persisted record); a closed channel marks the handle dead.
    /// Returns whether the message was enqueued.
    pub fn send(&self, msg: OutboundMessage) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection_id = %self.id, "send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Whether the connection is still alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_delivers_while_alive() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(Uuid::new_v4(), UserRole::Student, tx);

        assert!(handle.send(OutboundMessage::Ping { timestamp: 1 }));
        assert!(matches!(
            rx.recv().await,
            Some(OutboundMessage::Ping { timestamp: 1 })
        ));
    }

    #[tokio::test]
    async fn test_closed_channel_marks_handle_dead() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = ConnectionHandle::new(Uuid::new_v4(), UserRole::Student, tx);

        assert!(!handle.send(OutboundMessage::Ping { timestamp: 1 }));
        assert!(!handle.is_alive());
        assert!(!handle.send(OutboundMessage::Ping { timestamp: 2 }));
    }
}
