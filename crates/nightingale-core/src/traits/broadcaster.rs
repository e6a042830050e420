//! Live-session broadcaster capability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::events::NotificationCreated;

/// Push events to live sessions grouped into rooms.
///
/// The delivery dispatcher depends on this abstraction rather than a
/// process-wide transport singleton, so tests can substitute a double
/// that records emitted events. Implementations are best-effort and
/// non-blocking: an identity with zero open sessions absorbs the event
/// silently, and transport failures are logged, never returned.
#[async_trait]
pub trait Broadcaster: Send + Sync + std::fmt::Debug {
    /// Emit an event to every live session of one identity.
    async fn emit_to_identity(&self, user_id: Uuid, event: &NotificationCreated);

    /// Emit an event to every live session subscribed to a room.
    async fn emit_to_room(&self, room: &str, event: &NotificationCreated);
}
