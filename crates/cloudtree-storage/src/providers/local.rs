//! Local filesystem byte store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use cloudtree_core::error::{AppError, ErrorKind};
use cloudtree_core::result::AppResult;
use cloudtree_core::traits::storage::{ByteStore, ByteStream};
use cloudtree_core::types::StorageKey;

/// Byte store that keeps each key in its own file below a root directory.
///
/// Keys are fanned out over subdirectories named after their first two
/// characters so a single directory never grows unbounded.
#[derive(Debug, Clone)]
pub struct LocalByteStore {
    root: PathBuf,
}

impl LocalByteStore {
    /// Create a byte store rooted at the given path, creating it if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &StorageKey) -> PathBuf {
        let name = key.as_str();
        let shard: String = name.chars().take(2).collect();
        self.root.join(shard).join(name)
    }

    async fn prepare(&self, key: &StorageKey) -> AppResult<PathBuf> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create shard directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(path)
    }

    /// Pick the key a rekey should land on: the hint when it is a valid,
    /// unused key, otherwise a fresh one.
    async fn free_key_for(&self, hint: &str) -> StorageKey {
        match StorageKey::parse(hint) {
            Ok(key) if !fs::try_exists(self.resolve(&key)).await.unwrap_or(true) => key,
            _ => StorageKey::generate(),
        }
    }
}

fn open_error(key: &StorageKey, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("No contents stored under {key}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to open {key}"), e)
    }
}

/// Remove a partly written file so its key is free again.
async fn discard_on_error(path: &Path, written: std::io::Result<()>) -> AppResult<()> {
    let Err(e) = written else {
        return Ok(());
    };
    if let Err(cleanup) = fs::remove_file(path).await {
        warn!(path = %path.display(), error = %cleanup, "Failed to remove partial write");
    }
    Err(AppError::with_source(
        ErrorKind::Storage,
        format!("Failed to write {}", path.display()),
        e,
    ))
}

#[async_trait]
impl ByteStore for LocalByteStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }

    async fn put(&self, key: &StorageKey, data: Bytes) -> AppResult<StorageKey> {
        let path = self.prepare(key).await?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    AppError::already_exists(format!("Storage key {key} is already occupied"))
                } else {
                    AppError::with_source(ErrorKind::Storage, format!("Failed to create {key}"), e)
                }
            })?;

        let written = async {
            file.write_all(&data).await?;
            file.flush().await
        }
        .await;
        discard_on_error(&path, written).await?;

        debug!(key = %key, bytes = data.len(), "Stored contents");
        Ok(key.clone())
    }

    async fn get(&self, key: &StorageKey) -> AppResult<ByteStream> {
        let file = fs::File::open(self.resolve(key))
            .await
            .map_err(|e| open_error(key, e))?;
        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn read_bytes(&self, key: &StorageKey) -> AppResult<Bytes> {
        let data = fs::read(self.resolve(key))
            .await
            .map_err(|e| open_error(key, e))?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &StorageKey) -> AppResult<()> {
        match fs::remove_file(self.resolve(key)).await {
            Ok(()) => {
                debug!(key = %key, "Removed contents");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete {key}"),
                e,
            )),
        }
    }

    async fn duplicate(&self, source: &StorageKey) -> AppResult<StorageKey> {
        let target = StorageKey::generate();
        let to = self.prepare(&target).await?;
        fs::copy(self.resolve(source), &to)
            .await
            .map_err(|e| open_error(source, e))?;
        debug!(source = %source, target = %target, "Duplicated contents");
        Ok(target)
    }

    async fn rekey(&self, old: &StorageKey, hint: &str) -> AppResult<StorageKey> {
        let target = self.free_key_for(hint).await;
        let to = self.prepare(&target).await?;
        fs::rename(self.resolve(old), &to)
            .await
            .map_err(|e| open_error(old, e))?;
        debug!(from = %old, to = %target, "Rekeyed contents");
        Ok(target)
    }

    async fn exists(&self, key: &StorageKey) -> AppResult<bool> {
        Ok(fs::try_exists(self.resolve(key)).await?)
    }
}

#[cfg(test)]
mod tests {
    use cloudtree_core::ErrorKind;
    use futures::TryStreamExt;

    use super::*;

    async fn store() -> (tempfile::TempDir, LocalByteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalByteStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_file() {
        let (dir, _store) = store().await;
        let path = dir.path().join("partial");
        fs::write(&path, b"half").await.unwrap();

        let err = discard_on_error(&path, Err(std::io::Error::other("disk full")))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(!path.exists());

        discard_on_error(&path, Ok(())).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_read_delete() {
        let (_dir, store) = store().await;
        let key = StorageKey::generate();

        store.put(&key, Bytes::from("hello world")).await.unwrap();
        assert!(store.exists(&key).await.unwrap());
        assert_eq!(store.read_bytes(&key).await.unwrap(), Bytes::from("hello world"));

        store.delete(&key).await.unwrap();
        assert!(!store.exists(&key).await.unwrap());
        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_refuses_occupied_key() {
        let (_dir, store) = store().await;
        let key = StorageKey::generate();
        store.put(&key, Bytes::from("first")).await.unwrap();

        let err = store.put(&key, Bytes::from("second")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyExists);
        assert_eq!(store.read_bytes(&key).await.unwrap(), Bytes::from("first"));
    }

    #[tokio::test]
    async fn test_duplicate_and_rekey() {
        let (_dir, store) = store().await;
        let key = StorageKey::generate();
        store.put(&key, Bytes::from("content")).await.unwrap();

        let copy = store.duplicate(&key).await.unwrap();
        assert_ne!(copy, key);
        assert!(store.exists(&key).await.unwrap());

        let moved = store.rekey(&copy, "renamed").await.unwrap();
        assert_eq!(moved.as_str(), "renamed");
        assert!(!store.exists(&copy).await.unwrap());

        let chunks: Vec<Bytes> = store.get(&moved).await.unwrap().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"content".to_vec());
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.read_bytes(&StorageKey::generate()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
