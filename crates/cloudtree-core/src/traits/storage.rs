//! Byte-store trait for pluggable physical storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;
use crate::types::StorageKey;

/// A byte stream type used for reading stored contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Content storage addressed by opaque [`StorageKey`]s.
///
/// Implementations live in `cloudtree-storage`. Every operation is
/// deterministic: `put` on an occupied key fails with `AlreadyExists`
/// instead of overwriting, and `duplicate`/`rekey` always land on a key
/// that was free at the time of the call.
#[async_trait]
pub trait ByteStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Persist `data` under `key` and return the key.
    async fn put(&self, key: &StorageKey, data: Bytes) -> AppResult<StorageKey>;

    /// Stream the contents stored under `key`.
    async fn get(&self, key: &StorageKey) -> AppResult<ByteStream>;

    /// Read the full contents stored under `key` into memory.
    async fn read_bytes(&self, key: &StorageKey) -> AppResult<Bytes>;

    /// Remove the contents stored under `key`. Removing a missing key is a
    /// no-op.
    async fn delete(&self, key: &StorageKey) -> AppResult<()>;

    /// Copy the contents of `source` to a freshly generated key.
    async fn duplicate(&self, source: &StorageKey) -> AppResult<StorageKey>;

    /// Move the contents of `old` to a new key derived from `hint`, falling
    /// back to a generated key when the hint is taken.
    async fn rekey(&self, old: &StorageKey, hint: &str) -> AppResult<StorageKey>;

    /// Check whether contents exist under `key`.
    async fn exists(&self, key: &StorageKey) -> AppResult<bool>;
}
