//! Creating folders and ingesting file contents.

use std::collections::HashSet;

use bytes::Bytes;
use tracing::{info, warn};

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::{FolderId, StorageKey, TenantId};
use cloudtree_database::traits::{FileRepository, FolderRepository};
use cloudtree_entity::file::split_file_name;
use cloudtree_entity::{CreateFile, CreateFolder, File, Folder};

use super::{TreeEngine, validate_name};
use crate::context::RequestContext;

/// A file to ingest: its display name and full contents.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Display name including the extension.
    pub name: String,
    /// File contents.
    pub data: Bytes,
}

impl FileUpload {
    /// Creates a new upload.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// A validated upload waiting to be written.
struct PreparedUpload {
    name: String,
    extension: String,
    data: Bytes,
}

impl TreeEngine {
    /// Create a folder under `parent_id` (or at the requester's root).
    ///
    /// The new folder belongs to the parent's tenant, which lets a guest
    /// create inside a folder shared with them.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
        name: &str,
    ) -> AppResult<Folder> {
        let name = validate_name(name)?;
        let (tenant_id, _) = self.destination(ctx, parent_id).await?;

        let repo = self.nodes.repository();
        if repo
            .folder_name_exists(tenant_id, parent_id, &name, None)
            .await?
        {
            return Err(AppError::already_exists(format!(
                "Folder '{name}' already exists"
            )));
        }

        let folder = repo
            .create_folder(&CreateFolder {
                tenant_id,
                parent_id,
                name,
                storage_key: StorageKey::generate(),
            })
            .await?;

        info!(
            tenant_id = %folder.tenant_id,
            folder_id = %folder.id,
            name = %folder.name,
            "Folder created"
        );
        Ok(folder)
    }

    /// Store a single file under `parent_id`.
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
        upload: FileUpload,
    ) -> AppResult<File> {
        let mut files = self.upload(ctx, parent_id, vec![upload]).await?;
        files
            .pop()
            .ok_or_else(|| AppError::internal("Upload produced no file"))
    }

    /// Store a batch of files under `parent_id`.
    ///
    /// Names and the combined size are checked before anything is written,
    /// so a batch that does not fit is refused as a whole.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
        uploads: Vec<FileUpload>,
    ) -> AppResult<Vec<File>> {
        let (tenant_id, _) = self.destination(ctx, parent_id).await?;
        let prepared = self.prepare_uploads(tenant_id, parent_id, uploads).await?;

        let total: i64 = prepared.iter().map(|u| u.data.len() as i64).sum();
        self.quota.ensure_capacity(tenant_id, total).await?;

        let mut stored = Vec::with_capacity(prepared.len());
        for upload in prepared {
            stored.push(self.store_upload(tenant_id, parent_id, upload).await?);
        }
        Ok(stored)
    }

    async fn prepare_uploads(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        uploads: Vec<FileUpload>,
    ) -> AppResult<Vec<PreparedUpload>> {
        let mut seen = HashSet::new();
        let mut prepared = Vec::with_capacity(uploads.len());

        for upload in uploads {
            let display = validate_name(&upload.name)?;
            if upload.data.len() as u64 > self.max_upload_size_bytes {
                return Err(AppError::validation(format!(
                    "'{display}' exceeds the maximum upload size of {} bytes",
                    self.max_upload_size_bytes
                )));
            }

            let (name, extension) = split_file_name(&display);
            let taken = !seen.insert((name.clone(), extension.clone()))
                || self
                    .nodes
                    .repository()
                    .file_name_exists(tenant_id, parent_id, &name, &extension, None)
                    .await?;
            if taken {
                return Err(AppError::already_exists(format!(
                    "File '{display}' already exists"
                )));
            }

            prepared.push(PreparedUpload {
                name,
                extension,
                data: upload.data,
            });
        }
        Ok(prepared)
    }

    async fn store_upload(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        upload: PreparedUpload,
    ) -> AppResult<File> {
        let size_bytes = upload.data.len() as i64;
        let key = self.store.put(&StorageKey::generate(), upload.data).await?;

        let created = self
            .nodes
            .repository()
            .create_file(&CreateFile {
                tenant_id,
                parent_id,
                name: upload.name,
                extension: upload.extension,
                size_bytes,
                storage_key: key.clone(),
            })
            .await;

        let file = match created {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&key).await {
                    warn!(key = %key, error = %cleanup, "Failed to remove orphaned contents");
                }
                return Err(e);
            }
        };

        self.charge_new_file(&file).await?;

        info!(
            tenant_id = %tenant_id,
            file_id = %file.id,
            name = %file.display_name(),
            size_bytes,
            "File stored"
        );
        Ok(file)
    }

    /// Charge a freshly created file to its tenant. If the ledger cannot be
    /// updated the record and its contents are removed again.
    pub(super) async fn charge_new_file(&self, file: &File) -> AppResult<()> {
        let Err(e) = self.quota.adjust_usage(file.tenant_id, file.size_bytes).await else {
            return Ok(());
        };
        if let Err(cleanup) = self.nodes.repository().delete_file(file.id).await {
            warn!(file_id = %file.id, error = %cleanup, "Failed to remove uncharged file");
        }
        if let Err(cleanup) = self.store.delete(&file.storage_key).await {
            warn!(
                key = %file.storage_key,
                error = %cleanup,
                "Failed to remove uncharged contents"
            );
        }
        Err(e)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use cloudtree_core::config::StorageConfig;
    use cloudtree_core::types::TenantId;
    use cloudtree_database::MemoryDatabase;
    use cloudtree_database::traits::TenantRepository;
    use cloudtree_entity::{CreateTenant, NodeId, Tenant, UsageAdjustment};
    use cloudtree_storage::MemoryByteStore;

    use super::*;
    use crate::quota::QuotaLedger;

    /// Tenant storage whose usage updates can be switched off.
    struct FlakyLedger {
        db: Arc<MemoryDatabase>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl TenantRepository for FlakyLedger {
        async fn find_tenant(&self, id: TenantId) -> AppResult<Option<Tenant>> {
            self.db.find_tenant(id).await
        }

        async fn find_tenant_by_name(&self, name: &str) -> AppResult<Option<Tenant>> {
            self.db.find_tenant_by_name(name).await
        }

        async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant> {
            self.db.create_tenant(data).await
        }

        async fn update_tenant(&self, tenant: &Tenant) -> AppResult<Tenant> {
            self.db.update_tenant(tenant).await
        }

        async fn delete_tenant(&self, id: TenantId) -> AppResult<()> {
            self.db.delete_tenant(id).await
        }

        async fn adjust_used_bytes(&self, id: TenantId, delta: i64) -> AppResult<UsageAdjustment> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::internal("ledger unavailable"));
            }
            self.db.adjust_used_bytes(id, delta).await
        }
    }

    struct Fixture {
        engine: TreeEngine,
        ledger: Arc<FlakyLedger>,
        store: Arc<MemoryByteStore>,
        ctx: RequestContext,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(MemoryDatabase::new());
        let ledger = Arc::new(FlakyLedger {
            db: db.clone(),
            fail: AtomicBool::new(false),
        });
        let tenant = ledger
            .create_tenant(&CreateTenant {
                name: "acme".into(),
                allocated_bytes: 1000,
            })
            .await
            .unwrap();
        let store = Arc::new(MemoryByteStore::new());
        let engine = TreeEngine::new(
            db,
            store.clone(),
            Arc::new(QuotaLedger::new(ledger.clone())),
            &StorageConfig::default(),
        );
        Fixture {
            engine,
            ledger,
            store,
            ctx: RequestContext::new(tenant.id),
        }
    }

    #[tokio::test]
    async fn test_upload_is_undone_when_usage_cannot_be_charged() {
        let f = fixture().await;
        f.ledger.fail.store(true, Ordering::SeqCst);

        let result = f
            .engine
            .upload_file(&f.ctx, None, FileUpload::new("a.txt", "hello"))
            .await;
        assert!(result.is_err());
        assert!(f.store.is_empty());
        assert!(f.engine.list(&f.ctx, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_copy_is_undone_when_usage_cannot_be_charged() {
        let f = fixture().await;
        let docs = f.engine.create_folder(&f.ctx, None, "Docs").await.unwrap();
        let file = f
            .engine
            .upload_file(&f.ctx, None, FileUpload::new("a.txt", "hello"))
            .await
            .unwrap();
        f.ledger.fail.store(true, Ordering::SeqCst);

        let result = f
            .engine
            .copy(&f.ctx, NodeId::File(file.id), Some(docs.id))
            .await;
        assert!(result.is_err());
        assert_eq!(f.store.len(), 1);
        assert!(f.engine.list(&f.ctx, Some(docs.id)).await.unwrap().is_empty());
        assert_eq!(f.engine.quota().usage(f.ctx.tenant_id).await.unwrap().used_bytes, 5);
    }
}
