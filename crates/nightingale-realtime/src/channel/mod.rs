//! Room grouping for live sessions.

pub mod registry;
pub mod rooms;

pub use registry::RoomRegistry;
