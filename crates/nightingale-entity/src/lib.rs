//! Entity models shared between the database, service, and API layers.

pub mod notification;
pub mod student;
pub mod user;
