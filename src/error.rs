//! Error types for the store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the store.
///
/// Lookups never fail: a missing or expired identifier is reported as `None`
/// by [`crate::cache::CacheStore::get`]. Only construction can fail.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No tokio runtime was available to host the expiry waiters
    #[error("No tokio runtime available: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

// == Result Type Alias ==
/// Convenience Result type for the store.
pub type Result<T> = std::result::Result<T, CacheError>;
