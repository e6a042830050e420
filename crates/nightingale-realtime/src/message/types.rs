//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nightingale_core::events::NotificationCreated;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Subscribe to a room.
    Subscribe {
        /// Room name, e.g. `course:bsc-nursing`.
        room: String,
    },
    /// Unsubscribe from a room.
    Unsubscribe {
        /// Room name.
        room: String,
    },
    /// Pong response to a server ping.
    Pong {
        /// Echoed timestamp.
        timestamp: i64,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A notification was broadcast to this session.
    #[serde(rename = "notification:created")]
    Notification {
        /// Notification record ID.
        id: Uuid,
        /// Title.
        title: String,
        /// Body text.
        message: String,
        /// Kind (info/success/warning/danger).
        kind: String,
        /// Category label.
        category: String,
        /// Priority level.
        priority: String,
        /// When the record was created.
        created_at: DateTime<Utc>,
        /// Sender identity.
        sender: Uuid,
    },
    /// Subscription confirmed.
    Subscribed {
        /// Room name.
        room: String,
    },
    /// Unsubscription confirmed.
    Unsubscribed {
        /// Room name.
        room: String,
    },
    /// Server keepalive.
    Ping {
        /// Server timestamp.
        timestamp: i64,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl From<&NotificationCreated> for OutboundMessage {
    fn from(event: &NotificationCreated) -> Self {
        Self::Notification {
            id: event.id,
            title: event.title.clone(),
            message: event.message.clone(),
            kind: event.kind.clone(),
            category: event.category.clone(),
            priority: event.priority.clone(),
            created_at: event.created_at,
            sender: event.sender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_subscribe_wire_format() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"subscribe","room":"batch:2024"}"#).unwrap();
        match msg {
            InboundMessage::Subscribe { room } => assert_eq!(room, "batch:2024"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_outbound_notification_is_tagged() {
        let event = NotificationCreated {
            id: Uuid::new_v4(),
            title: "t".into(),
            message: "m".into(),
            kind: "info".into(),
            category: "General".into(),
            priority: "medium".into(),
            created_at: Utc::now(),
            sender: Uuid::new_v4(),
        };
        let json = serde_json::to_value(OutboundMessage::from(&event)).unwrap();
        assert_eq!(json["type"], "notification:created");
        assert_eq!(json["priority"], "medium");
    }
}
