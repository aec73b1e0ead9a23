//! The string key-value trait every backend implements.

use crate::StoreError;

/// A flat string-to-string store with last-write-wins semantics.
///
/// Values are opaque strings; callers layer their own encoding on top
/// (see [`crate::SessionCache`]). Reading an absent key is not an error.
pub trait KvStore: Send + Sync {
    /// Retrieve the value for `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
