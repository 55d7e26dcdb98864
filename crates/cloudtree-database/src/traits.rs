//! Repository contracts consumed by the service layer.
//!
//! Reads that filter on `trashed` match the flag exactly; callers that need
//! both states issue two calls. `create_*`/`update_*` fail with `NotFound`
//! when the referenced tenant or parent is missing and refuse a node that
//! would be its own parent. Sibling names are unique among non-trashed
//! records of the same kind, reported as `AlreadyExists`.

use async_trait::async_trait;

use cloudtree_core::result::AppResult;
use cloudtree_core::types::{FileId, FolderId, StorageKey, TenantId};
use cloudtree_entity::{
    CreateFile, CreateFolder, CreateTenant, CreateTrashRecord, File, Folder, NodeFlag, NodeId,
    ShareRecord, ShareSettings, Tenant, TrashRecord, UsageAdjustment,
};

/// Folder records.
#[async_trait]
pub trait FolderRepository: Send + Sync + 'static {
    /// Find a folder by ID regardless of its trashed state.
    async fn find_folder(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Find a folder by its storage key.
    async fn find_folder_by_storage_key(&self, key: &StorageKey) -> AppResult<Option<Folder>>;

    /// Direct child folders of `parent_id` whose trashed flag equals `trashed`.
    async fn find_child_folders(&self, parent_id: FolderId, trashed: bool)
    -> AppResult<Vec<Folder>>;

    /// Parentless folders of a tenant whose trashed flag equals `trashed`.
    async fn find_root_folders(&self, tenant_id: TenantId, trashed: bool)
    -> AppResult<Vec<Folder>>;

    /// Whether a non-trashed sibling folder already has `name`.
    async fn folder_name_exists(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        name: &str,
        exclude: Option<FolderId>,
    ) -> AppResult<bool>;

    /// Non-trashed folders of a tenant with `flag` set.
    async fn find_folders_by_flag(&self, tenant_id: TenantId, flag: NodeFlag)
    -> AppResult<Vec<Folder>>;

    /// Insert a folder.
    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Persist every mutable column of `folder`.
    async fn update_folder(&self, folder: &Folder) -> AppResult<Folder>;

    /// Remove a folder record.
    async fn delete_folder(&self, id: FolderId) -> AppResult<()>;
}

/// File records.
#[async_trait]
pub trait FileRepository: Send + Sync + 'static {
    /// Find a file by ID regardless of its trashed state.
    async fn find_file(&self, id: FileId) -> AppResult<Option<File>>;

    /// Find a file by its storage key.
    async fn find_file_by_storage_key(&self, key: &StorageKey) -> AppResult<Option<File>>;

    /// Direct child files of `parent_id` whose trashed flag equals `trashed`.
    async fn find_child_files(&self, parent_id: FolderId, trashed: bool) -> AppResult<Vec<File>>;

    /// Parentless files of a tenant whose trashed flag equals `trashed`.
    async fn find_root_files(&self, tenant_id: TenantId, trashed: bool) -> AppResult<Vec<File>>;

    /// Every file of a tenant, trashed or not.
    async fn find_files_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<File>>;

    /// Whether a non-trashed sibling file already has `name` + `extension`.
    async fn file_name_exists(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        name: &str,
        extension: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool>;

    /// Non-trashed files of a tenant with `flag` set.
    async fn find_files_by_flag(&self, tenant_id: TenantId, flag: NodeFlag)
    -> AppResult<Vec<File>>;

    /// Insert a file.
    async fn create_file(&self, data: &CreateFile) -> AppResult<File>;

    /// Persist every mutable column of `file`.
    async fn update_file(&self, file: &File) -> AppResult<File>;

    /// Remove a file record.
    async fn delete_file(&self, id: FileId) -> AppResult<()>;
}

/// Trash records.
#[async_trait]
pub trait TrashRepository: Send + Sync + 'static {
    /// Insert a trash record. At most one exists per target.
    async fn create_trash_record(&self, data: &CreateTrashRecord) -> AppResult<TrashRecord>;

    /// Find the trash record of a node.
    async fn find_trash_record(&self, target: NodeId) -> AppResult<Option<TrashRecord>>;

    /// Remove the trash record of a node. Missing records are ignored.
    async fn delete_trash_record(&self, target: NodeId) -> AppResult<()>;

    /// Trash records of a tenant, newest first.
    async fn find_trash_records(&self, tenant_id: TenantId) -> AppResult<Vec<TrashRecord>>;
}

/// Share records.
#[async_trait]
pub trait ShareRepository: Send + Sync + 'static {
    /// Find the share record of a node.
    async fn find_share_record(&self, target: NodeId) -> AppResult<Option<ShareRecord>>;

    /// Create or replace the share record of a node.
    async fn upsert_share_record(
        &self,
        tenant_id: TenantId,
        target: NodeId,
        settings: ShareSettings,
    ) -> AppResult<ShareRecord>;

    /// Remove the share record of a node. Missing records are ignored.
    async fn delete_share_record(&self, target: NodeId) -> AppResult<()>;
}

/// Durable storage for the whole tree: folders, files, trash and shares.
pub trait TreeRepository:
    FolderRepository + FileRepository + TrashRepository + ShareRepository
{
}

impl<T> TreeRepository for T where
    T: FolderRepository + FileRepository + TrashRepository + ShareRepository
{
}

/// Tenants and their quota ledger entries.
#[async_trait]
pub trait TenantRepository: Send + Sync + 'static {
    /// Find a tenant by ID.
    async fn find_tenant(&self, id: TenantId) -> AppResult<Option<Tenant>>;

    /// Find a tenant by its unique name.
    async fn find_tenant_by_name(&self, name: &str) -> AppResult<Option<Tenant>>;

    /// Insert a tenant with zero used bytes.
    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant>;

    /// Persist the tenant's name and allocation. Used bytes are only ever
    /// changed through [`TenantRepository::adjust_used_bytes`].
    async fn update_tenant(&self, tenant: &Tenant) -> AppResult<Tenant>;

    /// Remove a tenant and every record it owns.
    async fn delete_tenant(&self, id: TenantId) -> AppResult<()>;

    /// Atomically apply a signed delta to used bytes, clamping at zero.
    async fn adjust_used_bytes(&self, id: TenantId, delta: i64) -> AppResult<UsageAdjustment>;
}
