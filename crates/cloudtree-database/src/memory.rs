//! In-memory repository with the same constraint semantics as the
//! PostgreSQL schema. Backs tests and the `memory` deployment profile.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::{
    FileId, FolderId, ShareRecordId, StorageKey, TenantId, TrashRecordId,
};
use cloudtree_entity::{
    CreateFile, CreateFolder, CreateTenant, CreateTrashRecord, File, Folder, NodeFlag,
    NodeId, ShareRecord, ShareSettings, Tenant, TrashRecord, UsageAdjustment,
};

use crate::traits::{
    FileRepository, FolderRepository, ShareRepository, TenantRepository, TrashRepository,
};

#[derive(Debug, Default)]
struct State {
    tenants: HashMap<TenantId, Tenant>,
    folders: HashMap<FolderId, Folder>,
    files: HashMap<FileId, File>,
    trash: HashMap<NodeId, TrashRecord>,
    shares: HashMap<NodeId, ShareRecord>,
}

impl State {
    fn require_tenant(&self, id: TenantId) -> AppResult<()> {
        if self.tenants.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Tenant {id} not found")))
        }
    }

    fn require_parent(&self, parent_id: Option<FolderId>) -> AppResult<()> {
        match parent_id {
            Some(id) if !self.folders.contains_key(&id) => {
                Err(AppError::not_found(format!("Parent folder {id} not found")))
            }
            _ => Ok(()),
        }
    }

    fn storage_key_taken(&self, key: &StorageKey) -> bool {
        self.folders.values().any(|f| &f.storage_key == key)
            || self.files.values().any(|f| &f.storage_key == key)
    }

    fn folder_name_taken(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        name: &str,
        exclude: Option<FolderId>,
    ) -> bool {
        self.folders.values().any(|f| {
            !f.trashed
                && f.tenant_id == tenant_id
                && f.parent_id == parent_id
                && f.name == name
                && Some(f.id) != exclude
        })
    }

    fn file_name_taken(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        name: &str,
        extension: &str,
        exclude: Option<FileId>,
    ) -> bool {
        self.files.values().any(|f| {
            !f.trashed
                && f.tenant_id == tenant_id
                && f.parent_id == parent_id
                && f.name == name
                && f.extension == extension
                && Some(f.id) != exclude
        })
    }

    /// Remove a folder together with everything still attached below it,
    /// and detach trash records that pointed at it.
    fn remove_folder_cascade(&mut self, id: FolderId) {
        if self.folders.remove(&id).is_none() {
            return;
        }
        self.files.retain(|_, f| f.parent_id != Some(id));
        let children: Vec<FolderId> = self
            .folders
            .values()
            .filter(|f| f.parent_id == Some(id))
            .map(|f| f.id)
            .collect();
        for child in children {
            self.remove_folder_cascade(child);
        }
        for record in self.trash.values_mut() {
            if record.original_parent_id == Some(id) {
                record.original_parent_id = None;
            }
        }
    }
}

fn has_flag(flag: NodeFlag, favorite: bool, pinned: bool, frozen: bool) -> bool {
    match flag {
        NodeFlag::Favorite => favorite,
        NodeFlag::Pinned => pinned,
        NodeFlag::Frozen => frozen,
    }
}

fn sort_folders(mut folders: Vec<Folder>) -> Vec<Folder> {
    folders.sort_by(|a, b| b.pinned.cmp(&a.pinned).then_with(|| a.name.cmp(&b.name)));
    folders
}

fn sort_files(mut files: Vec<File>) -> Vec<File> {
    files.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.extension.cmp(&b.extension))
    });
    files
}

/// Tree and tenant repository held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<RwLock<State>>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FolderRepository for MemoryDatabase {
    async fn find_folder(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn find_folder_by_storage_key(&self, key: &StorageKey) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .find(|f| &f.storage_key == key)
            .cloned())
    }

    async fn find_child_folders(
        &self,
        parent_id: FolderId,
        trashed: bool,
    ) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        Ok(sort_folders(
            state
                .folders
                .values()
                .filter(|f| f.parent_id == Some(parent_id) && f.trashed == trashed)
                .cloned()
                .collect(),
        ))
    }

    async fn find_root_folders(&self, tenant_id: TenantId, trashed: bool) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        Ok(sort_folders(
            state
                .folders
                .values()
                .filter(|f| f.tenant_id == tenant_id && f.parent_id.is_none() && f.trashed == trashed)
                .cloned()
                .collect(),
        ))
    }

    async fn folder_name_exists(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        name: &str,
        exclude: Option<FolderId>,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .folder_name_taken(tenant_id, parent_id, name, exclude))
    }

    async fn find_folders_by_flag(
        &self,
        tenant_id: TenantId,
        flag: NodeFlag,
    ) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| {
                f.tenant_id == tenant_id && !f.trashed && has_flag(flag, f.favorite, f.pinned, f.frozen)
            })
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut state = self.state.write().await;
        state.require_tenant(data.tenant_id)?;
        state.require_parent(data.parent_id)?;
        if state.folder_name_taken(data.tenant_id, data.parent_id, &data.name, None) {
            return Err(AppError::already_exists(format!(
                "Folder '{}' already exists",
                data.name
            )));
        }
        if state.storage_key_taken(&data.storage_key) {
            return Err(AppError::already_exists(format!(
                "Storage key {} is already in use",
                data.storage_key
            )));
        }

        let now = Utc::now();
        let folder = Folder {
            id: FolderId::new(),
            tenant_id: data.tenant_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            storage_key: data.storage_key.clone(),
            trashed: false,
            pinned: false,
            frozen: false,
            favorite: false,
            shared: false,
            created_at: now,
            updated_at: now,
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn update_folder(&self, folder: &Folder) -> AppResult<Folder> {
        let mut state = self.state.write().await;
        if !state.folders.contains_key(&folder.id) {
            return Err(AppError::not_found(format!("Folder {} not found", folder.id)));
        }
        if folder.parent_id == Some(folder.id) {
            return Err(AppError::not_allowed(format!(
                "Folder {} cannot be its own parent",
                folder.id
            )));
        }
        if folder.trashed && folder.parent_id.is_some() {
            return Err(AppError::not_allowed(format!(
                "Trashed folder {} must be detached",
                folder.id
            )));
        }
        state.require_parent(folder.parent_id)?;
        if !folder.trashed
            && state.folder_name_taken(folder.tenant_id, folder.parent_id, &folder.name, Some(folder.id))
        {
            return Err(AppError::already_exists(format!(
                "Folder '{}' already exists",
                folder.name
            )));
        }

        let mut updated = folder.clone();
        updated.updated_at = Utc::now();
        state.folders.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        self.state.write().await.remove_folder_cascade(id);
        Ok(())
    }
}

#[async_trait]
impl FileRepository for MemoryDatabase {
    async fn find_file(&self, id: FileId) -> AppResult<Option<File>> {
        Ok(self.state.read().await.files.get(&id).cloned())
    }

    async fn find_file_by_storage_key(&self, key: &StorageKey) -> AppResult<Option<File>> {
        let state = self.state.read().await;
        Ok(state.files.values().find(|f| &f.storage_key == key).cloned())
    }

    async fn find_child_files(&self, parent_id: FolderId, trashed: bool) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        Ok(sort_files(
            state
                .files
                .values()
                .filter(|f| f.parent_id == Some(parent_id) && f.trashed == trashed)
                .cloned()
                .collect(),
        ))
    }

    async fn find_root_files(&self, tenant_id: TenantId, trashed: bool) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        Ok(sort_files(
            state
                .files
                .values()
                .filter(|f| f.tenant_id == tenant_id && f.parent_id.is_none() && f.trashed == trashed)
                .cloned()
                .collect(),
        ))
    }

    async fn find_files_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .values()
            .filter(|f| f.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn file_name_exists(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        name: &str,
        extension: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .file_name_taken(tenant_id, parent_id, name, extension, exclude))
    }

    async fn find_files_by_flag(&self, tenant_id: TenantId, flag: NodeFlag) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        let mut files: Vec<File> = state
            .files
            .values()
            .filter(|f| f.tenant_id == tenant_id && !f.trashed && has_flag(flag, f.favorite, f.pinned, f.frozen))
            .cloned()
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.extension.cmp(&b.extension)));
        Ok(files)
    }

    async fn create_file(&self, data: &CreateFile) -> AppResult<File> {
        let mut state = self.state.write().await;
        state.require_tenant(data.tenant_id)?;
        state.require_parent(data.parent_id)?;
        if state.file_name_taken(data.tenant_id, data.parent_id, &data.name, &data.extension, None) {
            return Err(AppError::already_exists(format!(
                "File '{}{}' already exists",
                data.name, data.extension
            )));
        }
        if state.storage_key_taken(&data.storage_key) {
            return Err(AppError::already_exists(format!(
                "Storage key {} is already in use",
                data.storage_key
            )));
        }

        let now = Utc::now();
        let file = File {
            id: FileId::new(),
            tenant_id: data.tenant_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            extension: data.extension.clone(),
            size_bytes: data.size_bytes,
            storage_key: data.storage_key.clone(),
            trashed: false,
            pinned: false,
            frozen: false,
            favorite: false,
            shared: false,
            created_at: now,
            updated_at: now,
        };
        state.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn update_file(&self, file: &File) -> AppResult<File> {
        let mut state = self.state.write().await;
        if !state.files.contains_key(&file.id) {
            return Err(AppError::not_found(format!("File {} not found", file.id)));
        }
        if file.trashed && file.parent_id.is_some() {
            return Err(AppError::not_allowed(format!(
                "Trashed file {} must be detached",
                file.id
            )));
        }
        state.require_parent(file.parent_id)?;
        if !file.trashed
            && state.file_name_taken(
                file.tenant_id,
                file.parent_id,
                &file.name,
                &file.extension,
                Some(file.id),
            )
        {
            return Err(AppError::already_exists(format!(
                "File '{}' already exists",
                file.display_name()
            )));
        }

        let mut updated = file.clone();
        updated.updated_at = Utc::now();
        state.files.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_file(&self, id: FileId) -> AppResult<()> {
        self.state.write().await.files.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl TrashRepository for MemoryDatabase {
    async fn create_trash_record(&self, data: &CreateTrashRecord) -> AppResult<TrashRecord> {
        let mut state = self.state.write().await;
        state.require_tenant(data.tenant_id)?;
        state.require_parent(data.original_parent_id)?;
        if state.trash.contains_key(&data.target) {
            return Err(AppError::already_exists(format!(
                "{} already has a trash record",
                data.target
            )));
        }

        let record = TrashRecord {
            id: TrashRecordId::new(),
            tenant_id: data.tenant_id,
            target_kind: data.target.kind(),
            target_id: data.target.as_uuid(),
            original_parent_id: data.original_parent_id,
            trashed_at: Utc::now(),
        };
        state.trash.insert(data.target, record.clone());
        Ok(record)
    }

    async fn find_trash_record(&self, target: NodeId) -> AppResult<Option<TrashRecord>> {
        Ok(self.state.read().await.trash.get(&target).cloned())
    }

    async fn delete_trash_record(&self, target: NodeId) -> AppResult<()> {
        self.state.write().await.trash.remove(&target);
        Ok(())
    }

    async fn find_trash_records(&self, tenant_id: TenantId) -> AppResult<Vec<TrashRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<TrashRecord> = state
            .trash
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.trashed_at.cmp(&a.trashed_at));
        Ok(records)
    }
}

#[async_trait]
impl ShareRepository for MemoryDatabase {
    async fn find_share_record(&self, target: NodeId) -> AppResult<Option<ShareRecord>> {
        Ok(self.state.read().await.shares.get(&target).cloned())
    }

    async fn upsert_share_record(
        &self,
        tenant_id: TenantId,
        target: NodeId,
        settings: ShareSettings,
    ) -> AppResult<ShareRecord> {
        let mut state = self.state.write().await;
        state.require_tenant(tenant_id)?;

        let now = Utc::now();
        let record = state
            .shares
            .entry(target)
            .and_modify(|r| {
                r.access_mode = settings.access_mode;
                r.open = settings.open;
                r.updated_at = now;
            })
            .or_insert_with(|| ShareRecord {
                id: ShareRecordId::new(),
                tenant_id,
                target_kind: target.kind(),
                target_id: target.as_uuid(),
                access_mode: settings.access_mode,
                open: settings.open,
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn delete_share_record(&self, target: NodeId) -> AppResult<()> {
        self.state.write().await.shares.remove(&target);
        Ok(())
    }
}

#[async_trait]
impl TenantRepository for MemoryDatabase {
    async fn find_tenant(&self, id: TenantId) -> AppResult<Option<Tenant>> {
        Ok(self.state.read().await.tenants.get(&id).cloned())
    }

    async fn find_tenant_by_name(&self, name: &str) -> AppResult<Option<Tenant>> {
        let state = self.state.read().await;
        Ok(state.tenants.values().find(|t| t.name == name).cloned())
    }

    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant> {
        let mut state = self.state.write().await;
        if state.tenants.values().any(|t| t.name == data.name) {
            return Err(AppError::already_exists(format!(
                "Tenant '{}' already exists",
                data.name
            )));
        }

        let now = Utc::now();
        let tenant = Tenant {
            id: TenantId::new(),
            name: data.name.clone(),
            allocated_bytes: data.allocated_bytes,
            used_bytes: 0,
            created_at: now,
            updated_at: now,
        };
        state.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn update_tenant(&self, tenant: &Tenant) -> AppResult<Tenant> {
        let mut state = self.state.write().await;
        if state
            .tenants
            .values()
            .any(|t| t.name == tenant.name && t.id != tenant.id)
        {
            return Err(AppError::already_exists(format!(
                "Tenant '{}' already exists",
                tenant.name
            )));
        }
        let stored = state
            .tenants
            .get_mut(&tenant.id)
            .ok_or_else(|| AppError::not_found(format!("Tenant {} not found", tenant.id)))?;
        stored.name = tenant.name.clone();
        stored.allocated_bytes = tenant.allocated_bytes;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_tenant(&self, id: TenantId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.tenants.remove(&id).is_none() {
            return Err(AppError::not_found(format!("Tenant {id} not found")));
        }
        state.folders.retain(|_, f| f.tenant_id != id);
        state.files.retain(|_, f| f.tenant_id != id);
        state.trash.retain(|_, r| r.tenant_id != id);
        state.shares.retain(|_, r| r.tenant_id != id);
        Ok(())
    }

    async fn adjust_used_bytes(&self, id: TenantId, delta: i64) -> AppResult<UsageAdjustment> {
        let mut state = self.state.write().await;
        let tenant = state
            .tenants
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))?;
        let adjustment = UsageAdjustment::apply(tenant.used_bytes, delta);
        tenant.used_bytes = adjustment.used_bytes;
        tenant.updated_at = Utc::now();
        Ok(adjustment)
    }
}
