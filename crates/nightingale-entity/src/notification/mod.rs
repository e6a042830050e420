//! Notification record entity and its value enums.

pub mod channel;
pub mod kind;
pub mod model;
pub mod priority;
pub mod receiver;
pub mod target;

pub use channel::SendMethod;
pub use kind::NotificationKind;
pub use model::{NewNotification, Notification, NotificationUpdate};
pub use priority::Priority;
pub use receiver::{AckReceiver, Receiver};
pub use target::TargetType;
