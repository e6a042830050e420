//! Notification broadcast event payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload pushed to recipient rooms (and the admin monitoring room)
/// when a notification is created.
///
/// Enum-valued fields travel as plain strings so the event stays a pure
/// wire payload with no entity-crate dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationCreated {
    /// Notification record ID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Kind (info/success/warning/danger).
    pub kind: String,
    /// Category label.
    pub category: String,
    /// Priority (low/medium/high/urgent).
    pub priority: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Sender identity.
    pub sender: Uuid,
}
