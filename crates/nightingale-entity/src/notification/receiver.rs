//! Per-recipient delivery and engagement state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Read-tracking entry for one recipient of one notification.
///
/// Uniqueness per (notification, identity) is enforced by the composite
/// primary key; the receiver set is fixed at creation time and only the
/// `read`/`read_at` fields mutate afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Receiver {
    /// Owning notification.
    pub notification_id: Uuid,
    /// Recipient identity.
    pub user_id: Uuid,
    /// Whether the recipient has read the notification.
    pub read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
}

/// Acknowledge-tracking entry, populated only when acknowledgment was
/// requested at creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AckReceiver {
    /// Owning notification.
    pub notification_id: Uuid,
    /// Recipient identity.
    pub user_id: Uuid,
    /// Whether the recipient has acknowledged the notification.
    pub acknowledged: bool,
    /// When the notification was acknowledged.
    pub acknowledged_at: Option<DateTime<Utc>>,
}
