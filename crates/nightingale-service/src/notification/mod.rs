//! Notification domain: audience resolution, delivery fan-out,
//! engagement tracking, and statistics.

pub mod audience;
pub mod dispatcher;
pub mod service;
pub mod stats;

pub use audience::{resolve_audience, DirectorySnapshot, StudentRecord};
pub use dispatcher::DeliveryDispatcher;
pub use service::{AckStatus, CreateNotification, NotificationService};
pub use stats::{aggregate, StatisticsReport};
