//! Cache Module
//!
//! Provides the in-memory store with maximum-lifetime and idle-lifetime
//! expiry.

mod entry;
mod stats;
mod store;
pub(crate) mod timer;


// Re-export public types
pub use stats::CacheStats;
pub use store::CacheStore;
pub use timer::ExpiryKind;

pub(crate) use store::{Fired, Shared};
