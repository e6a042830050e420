//! PostgreSQL access layer: connection pool (with embedded migrations)
//! and repositories.

pub mod connection;
pub mod repositories;
