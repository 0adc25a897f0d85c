//! Ordered-list persistence for the history logs
//!
//! Provides the list primitive the history log is built on, backed either by
//! Redis (shared across processes) or by process memory.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryListStore;
pub use self::redis::RedisListStore;

use crate::{Error, Result};
use async_trait::async_trait;

#[async_trait]
pub trait ListStore: Send + Sync {
    /// Insert `value` at the head of `key` and trim the list to its first
    /// `capacity` entries in one atomic step. Returns the trimmed length.
    /// A zero `capacity` is rejected before anything is written.
    async fn push_capped(&self, key: &str, value: String, capacity: usize) -> Result<usize>;

    /// Up to `limit` entries from the head of `key`. A missing key is empty.
    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>>;

    /// Remove every listed key in a single command.
    async fn delete(&self, keys: &[&str]) -> Result<()>;
}

/// Capacity shared by every `push_capped` implementation; zero would push and
/// then trim the new value straight back out.
pub(crate) fn check_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::InvalidRequest(
            "list capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}
