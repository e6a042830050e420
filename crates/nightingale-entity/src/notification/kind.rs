//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual/semantic kind of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Informational (default).
    Info,
    /// Positive outcome.
    Success,
    /// Needs attention.
    Warning,
    /// Critical.
    Danger,
}

impl Default for NotificationKind {
    fn default() -> Self {
        Self::Info
    }
}

impl NotificationKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
