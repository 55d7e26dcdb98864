//! Builds the configured byte store.

use std::sync::Arc;

use tracing::info;

use cloudtree_core::config::{ByteStoreProvider, StorageConfig};
use cloudtree_core::result::AppResult;
use cloudtree_core::traits::storage::ByteStore;

use crate::providers::{LocalByteStore, MemoryByteStore};

/// Instantiate the byte store selected by `config.provider`.
pub async fn open_byte_store(config: &StorageConfig) -> AppResult<Arc<dyn ByteStore>> {
    let store: Arc<dyn ByteStore> = match config.provider {
        ByteStoreProvider::Local => {
            Arc::new(LocalByteStore::new(&config.local.root_path).await?)
        }
        ByteStoreProvider::Memory => Arc::new(MemoryByteStore::new()),
    };
    info!(provider = store.provider_type(), "Byte store ready");
    Ok(store)
}
