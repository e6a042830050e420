//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use nightingale_database::repositories::notification::StatusFilter;
use nightingale_entity::notification::{
    NotificationKind, NotificationUpdate, Priority, SendMethod, TargetType,
};
use nightingale_service::notification::CreateNotification;

/// Create notification request body (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    /// Title.
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    /// Body text.
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
    /// Kind; defaults to `info`.
    #[serde(default)]
    pub kind: NotificationKind,
    /// Category; defaults to `General`.
    #[serde(default = "default_category")]
    pub category: String,
    /// Priority; defaults to `medium`.
    #[serde(default)]
    pub priority: Priority,
    /// Targeting rule; defaults to `all`.
    #[serde(default)]
    pub target_type: TargetType,
    /// Target references, interpreted per `target_type`.
    #[serde(default)]
    pub target_ids: Vec<String>,
    /// Requested delivery channels; defaults to `[dashboard]`.
    #[serde(default = "default_send_methods")]
    pub send_methods: Vec<SendMethod>,
    /// Optional call-to-action URL.
    #[validate(url(message = "action_url must be a valid URL"))]
    pub action_url: Option<String>,
    /// Optional call-to-action label.
    pub action_text: Option<String>,
    /// Optional schedule time; a future value holds delivery.
    pub schedule_at: Option<DateTime<Utc>>,
    /// Optional expiry time.
    pub expiry_date: Option<DateTime<Utc>>,
    /// Track per-recipient acknowledgment.
    #[serde(default)]
    pub requires_acknowledgment: bool,
}

impl CreateNotificationRequest {
    /// Convert to the service-layer input.
    pub fn into_input(self) -> CreateNotification {
        CreateNotification {
            title: self.title,
            message: self.message,
            kind: self.kind,
            category: self.category,
            priority: self.priority,
            target_type: self.target_type,
            target_ids: self.target_ids,
            send_methods: self.send_methods,
            action_url: self.action_url,
            action_text: self.action_text,
            schedule_at: self.schedule_at,
            expiry_date: self.expiry_date,
            requires_acknowledgment: self.requires_acknowledgment,
        }
    }
}

/// Update notification request body. Mirrors the allow-list; anything
/// else in the payload is dropped during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateNotificationRequest {
    /// New title.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New body text.
    #[validate(length(min = 1, max = 5000))]
    pub message: Option<String>,
    /// New kind.
    pub kind: Option<NotificationKind>,
    /// New category.
    pub category: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New call-to-action URL.
    #[validate(url)]
    pub action_url: Option<String>,
    /// New call-to-action label.
    pub action_text: Option<String>,
    /// New expiry time.
    pub expiry_date: Option<DateTime<Utc>>,
    /// New suppression state.
    pub is_active: Option<bool>,
}

impl UpdateNotificationRequest {
    /// Convert to the entity-level update.
    pub fn into_update(self) -> NotificationUpdate {
        NotificationUpdate {
            title: self.title,
            message: self.message,
            kind: self.kind,
            category: self.category,
            priority: self.priority,
            action_url: self.action_url,
            action_text: self.action_text,
            expiry_date: self.expiry_date,
            is_active: self.is_active,
        }
    }
}

/// Query parameters for the notification list.
#[derive(Debug, Clone, Deserialize)]
pub struct ListNotificationsQuery {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size; `limit` accepted as an alias.
    #[serde(default = "default_page_size", alias = "limit")]
    pub page_size: u64,
    /// Restrict to one category.
    pub category: Option<String>,
    /// Restrict to one priority.
    pub priority: Option<Priority>,
    /// Restrict to a lifecycle state.
    pub status: Option<StatusFilter>,
    /// Restrict to records created at or after this time.
    pub start_date: Option<DateTime<Utc>>,
    /// Restrict to records created at or before this time.
    pub end_date: Option<DateTime<Utc>>,
}

/// Query parameters for the statistics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    /// Only fold records created at or after this time.
    pub since: Option<DateTime<Utc>>,
}

fn default_category() -> String {
    "General".to_string()
}

fn default_send_methods() -> Vec<SendMethod> {
    vec![SendMethod::Dashboard]
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    25
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[test]
    fn test_minimal_create_body_fills_defaults() {
        let req: CreateNotificationRequest =
            serde_json::from_value(json!({"title": "Holiday", "message": "Closed Friday"}))
                .unwrap();
        assert_eq!(req.kind, NotificationKind::Info);
        assert_eq!(req.category, "General");
        assert_eq!(req.priority, Priority::Medium);
        assert_eq!(req.target_type, TargetType::All);
        assert_eq!(req.send_methods, vec![SendMethod::Dashboard]);
        assert!(!req.requires_acknowledgment);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_title_fails_validation() {
        let req: CreateNotificationRequest =
            serde_json::from_value(json!({"title": "", "message": "x"})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_drops_forged_sender() {
        let req: UpdateNotificationRequest =
            serde_json::from_value(json!({"title": "x", "sender_id": "abc"})).unwrap();
        let update = req.into_update();
        assert_eq!(update.title.as_deref(), Some("x"));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_with_only_unlisted_fields_is_empty() {
        // A payload made entirely of unlisted fields deserializes to an
        // empty update; the service applies nothing and succeeds.
        let req: UpdateNotificationRequest = serde_json::from_value(json!({
            "sender_id": "abc",
            "sent_count": 99,
            "schedule_at": "2026-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(req.into_update().is_empty());
    }

    #[test]
    fn test_list_query_limit_alias() {
        let query: ListNotificationsQuery =
            serde_json::from_value(json!({"limit": 10, "status": "scheduled"})).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.status, Some(StatusFilter::Scheduled));
    }
}
