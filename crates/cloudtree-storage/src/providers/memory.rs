//! In-memory byte store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::traits::storage::{ByteStore, ByteStream};
use cloudtree_core::types::StorageKey;

/// Byte store that keeps every key in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryByteStore {
    objects: Arc<DashMap<StorageKey, Bytes>>,
}

impl MemoryByteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn load(&self, key: &StorageKey) -> AppResult<Bytes> {
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("No contents stored under {key}")))
    }
}

#[async_trait]
impl ByteStore for MemoryByteStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &StorageKey, data: Bytes) -> AppResult<StorageKey> {
        match self.objects.entry(key.clone()) {
            Entry::Occupied(_) => Err(AppError::already_exists(format!(
                "Storage key {key} is already occupied"
            ))),
            Entry::Vacant(slot) => {
                debug!(key = %key, bytes = data.len(), "Stored contents");
                slot.insert(data);
                Ok(key.clone())
            }
        }
    }

    async fn get(&self, key: &StorageKey) -> AppResult<ByteStream> {
        let data = self.load(key)?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn read_bytes(&self, key: &StorageKey) -> AppResult<Bytes> {
        self.load(key)
    }

    async fn delete(&self, key: &StorageKey) -> AppResult<()> {
        self.objects.remove(key);
        Ok(())
    }

    async fn duplicate(&self, source: &StorageKey) -> AppResult<StorageKey> {
        let data = self.load(source)?;
        let target = StorageKey::generate();
        self.put(&target, data).await
    }

    async fn rekey(&self, old: &StorageKey, hint: &str) -> AppResult<StorageKey> {
        let (_, data) = self
            .objects
            .remove(old)
            .ok_or_else(|| AppError::not_found(format!("No contents stored under {old}")))?;
        let target = match StorageKey::parse(hint) {
            Ok(key) if !self.objects.contains_key(&key) => key,
            _ => StorageKey::generate(),
        };
        self.objects.insert(target.clone(), data);
        Ok(target)
    }

    async fn exists(&self, key: &StorageKey) -> AppResult<bool> {
        Ok(self.objects.contains_key(key))
    }
}
