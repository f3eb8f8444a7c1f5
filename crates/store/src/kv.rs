// SPDX-License-Identifier: MIT

//! The store trait and error type.

use thiserror::Error;

/// Errors surfaced by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid store key '{0}'")]
    InvalidKey(String),
}

/// A durable key-value store holding string values.
///
/// Get/set/remove are synchronous; callers treat writes as
/// fire-and-forget and must not rely on durability before return.
pub trait KvStore: Send + Sync {
    /// Read the value at `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value at `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
