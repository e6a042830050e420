//! Notification record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::channel::SendMethod;
use super::kind::NotificationKind;
use super::priority::Priority;
use super::target::TargetType;

/// A notification broadcast record.
///
/// `sent_count` always equals the number of receiver entries; the
/// receiver set is computed once at creation and never regrows.
/// "Scheduled" and "expired" are derived from the stored timestamps,
/// never stored separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// Title shown to recipients.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Kind (info/success/warning/danger).
    pub kind: NotificationKind,
    /// Free-form category label used for filtering and statistics.
    pub category: String,
    /// Priority level.
    pub priority: Priority,
    /// Identity that owns this broadcast.
    pub sender_id: Uuid,
    /// How `target_ids` is interpreted.
    pub target_type: TargetType,
    /// Target references; meaning depends on `target_type`.
    pub target_ids: Vec<String>,
    /// Requested delivery channels; at least `dashboard`.
    pub send_methods: Vec<SendMethod>,
    /// Optional call-to-action URL.
    pub action_url: Option<String>,
    /// Optional call-to-action label.
    pub action_text: Option<String>,
    /// Hold until this time before the broadcast counts as current.
    pub schedule_at: Option<DateTime<Utc>>,
    /// After this time the record is inert.
    pub expiry_date: Option<DateTime<Utc>>,
    /// When send-now stamped the record (out-of-band channel marker).
    pub sent_at: Option<DateTime<Utc>>,
    /// Soft-delete / suppression flag.
    pub is_active: bool,
    /// Denormalized receiver count; equals the receiver entry count.
    pub sent_count: i64,
    /// Denormalized read count; equals the number of read flags set.
    pub read_count: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Whether the record has passed its expiry date.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Whether the record is still held for a future schedule time.
    pub fn is_scheduled(&self, now: DateTime<Utc>) -> bool {
        self.schedule_at.map(|at| at > now).unwrap_or(false)
    }

    /// Fraction of receivers that have read the record. Zero when there
    /// are no receivers, never a division error.
    pub fn read_rate(&self) -> f64 {
        if self.sent_count > 0 {
            self.read_count as f64 / self.sent_count as f64
        } else {
            0.0
        }
    }
}

/// Data required to create a notification record.
///
/// The receiver set is resolved by the service layer before this struct
/// reaches the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// Title (non-empty).
    pub title: String,
    /// Body text (non-empty).
    pub message: String,
    /// Kind.
    pub kind: NotificationKind,
    /// Category label.
    pub category: String,
    /// Priority level.
    pub priority: Priority,
    /// Sending identity.
    pub sender_id: Uuid,
    /// Targeting rule.
    pub target_type: TargetType,
    /// Target references.
    pub target_ids: Vec<String>,
    /// Requested delivery channels.
    pub send_methods: Vec<SendMethod>,
    /// Optional call-to-action URL.
    pub action_url: Option<String>,
    /// Optional call-to-action label.
    pub action_text: Option<String>,
    /// Optional schedule time.
    pub schedule_at: Option<DateTime<Utc>>,
    /// Optional expiry time.
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Allow-listed mutable fields for post-creation updates.
///
/// Anything outside this set (sender, targeting, receivers, counters) is
/// immutable after creation; unknown payload fields are dropped during
/// deserialization, never applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationUpdate {
    /// New title.
    pub title: Option<String>,
    /// New body text.
    pub message: Option<String>,
    /// New kind.
    pub kind: Option<NotificationKind>,
    /// New category.
    pub category: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New call-to-action URL.
    pub action_url: Option<String>,
    /// New call-to-action label.
    pub action_text: Option<String>,
    /// New expiry time.
    pub expiry_date: Option<DateTime<Utc>>,
    /// New suppression state.
    pub is_active: Option<bool>,
}

impl NotificationUpdate {
    /// Whether the update carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.message.is_none()
            && self.kind.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.action_url.is_none()
            && self.action_text.is_none()
            && self.expiry_date.is_none()
            && self.is_active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(schedule_at: Option<DateTime<Utc>>, expiry_date: Option<DateTime<Utc>>) -> Notification {
        let now = Utc::now();
        Notification {
            id: Uuid::new_v4(),
            title: "Exam schedule".into(),
            message: "Posted on the board".into(),
            kind: NotificationKind::Info,
            category: "General".into(),
            priority: Priority::Medium,
            sender_id: Uuid::new_v4(),
            target_type: TargetType::All,
            target_ids: vec![],
            send_methods: vec![SendMethod::Dashboard],
            action_url: None,
            action_text: None,
            schedule_at,
            expiry_date,
            sent_at: None,
            is_active: true,
            sent_count: 0,
            read_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_derived_states_consistent_with_timestamps() {
        let now = Utc::now();
        let n = sample(Some(now + Duration::hours(1)), Some(now + Duration::days(1)));
        assert!(n.is_scheduled(now));
        assert!(!n.is_expired(now));

        let n = sample(None, Some(now - Duration::minutes(1)));
        assert!(!n.is_scheduled(now));
        assert!(n.is_expired(now));
    }

    #[test]
    fn test_read_rate_zero_receivers() {
        let n = sample(None, None);
        assert_eq!(n.read_rate(), 0.0);
    }

    #[test]
    fn test_read_rate() {
        let mut n = sample(None, None);
        n.sent_count = 4;
        n.read_count = 1;
        assert!((n.read_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_ignores_unlisted_fields() {
        // A forged sender in the payload must not survive deserialization.
        let body = serde_json::json!({ "title": "x", "sender_id": Uuid::new_v4() });
        let update: NotificationUpdate = serde_json::from_value(body).unwrap();
        assert_eq!(update.title.as_deref(), Some("x"));
        assert!(!update.is_empty());

        let roundtrip = serde_json::to_value(&update).unwrap();
        assert!(roundtrip.get("sender_id").is_none());
    }
}
