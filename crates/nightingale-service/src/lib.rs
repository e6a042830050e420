//! Business logic layer.
//!
//! Services own the rules; repositories own the SQL. Handlers call
//! services, never repositories directly.

pub mod context;
pub mod notification;

pub use context::RequestContext;
