//! Core building blocks shared by every Nightingale crate.
//!
//! Contains the unified error type, configuration schemas, pagination
//! types, domain events, and the capability traits that let the service
//! layer depend on abstractions (e.g. the live-session broadcaster)
//! instead of concrete transports.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
