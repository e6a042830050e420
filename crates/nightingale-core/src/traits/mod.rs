//! Capability traits implemented by infrastructure crates.

pub mod broadcaster;

pub use broadcaster::Broadcaster;
