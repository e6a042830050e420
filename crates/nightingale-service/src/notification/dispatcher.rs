//! Delivery fan-out.
//!
//! Pushes a freshly created notification to the live sessions of its
//! resolved audience. Delivery is best-effort: offline recipients rely
//! on the persisted receiver rows, and out-of-band channels (email,
//! sms) are recorded on the notification but never dispatched here.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use nightingale_core::events::NotificationCreated;
use nightingale_core::traits::Broadcaster;
use nightingale_entity::notification::{Notification, SendMethod};

/// Room watched by administrative dashboards; every broadcast is
/// mirrored there regardless of targeting.
pub const ADMIN_ROOM: &str = "admin:notifications";

/// Fans a notification out to live sessions.
#[derive(Debug, Clone)]
pub struct DeliveryDispatcher {
    broadcaster: Arc<dyn Broadcaster>,
}

impl DeliveryDispatcher {
    /// Create a dispatcher over a live-session broadcaster.
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Push `notification` to every resolved receiver and mirror it to
    /// the admin monitoring room.
    pub async fn dispatch(&self, notification: &Notification, receivers: &[Uuid]) {
        let event = event_for(notification);

        for channel in &notification.send_methods {
            if *channel != SendMethod::Dashboard {
                debug!(
                    notification_id = %notification.id,
                    channel = %channel,
                    "out-of-band channel recorded, not dispatched"
                );
            }
        }

        for user_id in receivers {
            self.broadcaster.emit_to_identity(*user_id, &event).await;
        }
        self.broadcaster.emit_to_room(ADMIN_ROOM, &event).await;

        debug!(
            notification_id = %notification.id,
            receivers = receivers.len(),
            "notification dispatched"
        );
    }
}

fn event_for(notification: &Notification) -> NotificationCreated {
    NotificationCreated {
        id: notification.id,
        title: notification.title.clone(),
        message: notification.message.clone(),
        kind: notification.kind.to_string(),
        category: notification.category.clone(),
        priority: notification.priority.to_string(),
        created_at: notification.created_at,
        sender: notification.sender_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    use nightingale_entity::notification::{NotificationKind, Priority, TargetType};

    #[derive(Debug, Default)]
    struct RecordingBroadcaster {
        identities: Mutex<Vec<Uuid>>,
        rooms: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Broadcaster for RecordingBroadcaster {
        async fn emit_to_identity(&self, user_id: Uuid, _event: &NotificationCreated) {
            self.identities.lock().unwrap().push(user_id);
        }

        async fn emit_to_room(&self, room: &str, _event: &NotificationCreated) {
            self.rooms.lock().unwrap().push(room.to_string());
        }
    }

    fn notification() -> Notification {
        let now = Utc::now();
        Notification {
            id: Uuid::new_v4(),
            title: "Clinical rotation".into(),
            message: "Ward assignments posted".into(),
            kind: NotificationKind::Info,
            category: "Clinical".into(),
            priority: Priority::High,
            sender_id: Uuid::new_v4(),
            target_type: TargetType::Students,
            target_ids: vec![],
            send_methods: vec![SendMethod::Dashboard, SendMethod::Email],
            action_url: None,
            action_text: None,
            schedule_at: None,
            expiry_date: None,
            sent_at: None,
            is_active: true,
            sent_count: 2,
            read_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_dispatch_reaches_every_receiver_and_admin_room() {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let dispatcher = DeliveryDispatcher::new(broadcaster.clone());

        let receivers = vec![Uuid::new_v4(), Uuid::new_v4()];
        dispatcher.dispatch(&notification(), &receivers).await;

        assert_eq!(*broadcaster.identities.lock().unwrap(), receivers);
        assert_eq!(*broadcaster.rooms.lock().unwrap(), vec![ADMIN_ROOM.to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_with_empty_audience_still_mirrors_to_admins() {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let dispatcher = DeliveryDispatcher::new(broadcaster.clone());

        dispatcher.dispatch(&notification(), &[]).await;

        assert!(broadcaster.identities.lock().unwrap().is_empty());
        assert_eq!(broadcaster.rooms.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_event_carries_record_fields_as_strings() {
        let n = notification();
        let event = event_for(&n);
        assert_eq!(event.id, n.id);
        assert_eq!(event.kind, "info");
        assert_eq!(event.priority, "high");
        assert_eq!(event.sender, n.sender_id);
    }
}
