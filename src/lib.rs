//! Dual Expiry - An in-process key/value store with two expiry policies
//!
//! Every entry is evicted once it exceeds a maximum lifetime since it was
//! stored, or a maximum idle time since it was last stored or read, whichever
//! comes first. Eviction is driven by per-entry timers on the tokio runtime,
//! so no external sweep is needed.
//!
//! ```no_run
//! use std::time::Duration;
//! use dual_expiry::CacheStore;
//!
//! # async fn demo() -> dual_expiry::error::Result<()> {
//! let store = CacheStore::new(Duration::from_secs(3), Duration::from_secs(1))?;
//! store.put("1", "objeto1".to_string());
//! assert_eq!(store.get("1").as_deref().map(String::as_str), Some("objeto1"));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{CacheStats, CacheStore, ExpiryKind};
pub use config::Config;
pub use error::{CacheError, Result};
