//! Repository implementations, one per aggregate.

pub mod notification;
pub mod student;
pub mod user;
