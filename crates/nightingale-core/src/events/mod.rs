//! Domain events carried over the live-session transport.

pub mod notification;

pub use notification::NotificationCreated;
