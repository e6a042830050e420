//! Live-session engine.
//!
//! Tracks open WebSocket connections, groups them into rooms, and fans
//! notification events out to them. Implements the core
//! [`Broadcaster`](nightingale_core::traits::Broadcaster) capability
//! consumed by the delivery dispatcher.

pub mod channel;
pub mod connection;
pub mod engine;
pub mod message;

pub use engine::RealtimeEngine;
