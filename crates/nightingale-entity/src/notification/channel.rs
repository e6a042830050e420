//! Delivery channel enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A delivery channel requested for a notification.
///
/// Only `Dashboard` is dispatched by this system; the other channels are
/// recorded for external gateways and never block dashboard delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "send_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SendMethod {
    /// In-app dashboard push + pull.
    Dashboard,
    /// External email gateway.
    Email,
    /// External SMS gateway.
    Sms,
}

impl SendMethod {
    /// Return the channel as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

impl fmt::Display for SendMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
