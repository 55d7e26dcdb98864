//! Folder queries.

use async_trait::async_trait;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::{FolderId, StorageKey, TenantId};
use cloudtree_entity::{CreateFolder, Folder, NodeFlag};

use super::{PgTreeRepository, map_read_error, map_write_error};
use crate::traits::FolderRepository;

#[async_trait]
impl FolderRepository for PgTreeRepository {
    async fn find_folder(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to find folder"))
    }

    async fn find_folder_by_storage_key(&self, key: &StorageKey) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE storage_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to find folder by storage key"))
    }

    async fn find_child_folders(
        &self,
        parent_id: FolderId,
        trashed: bool,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id = $1 AND trashed = $2 \
             ORDER BY pinned DESC, name ASC",
        )
        .bind(parent_id)
        .bind(trashed)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to list child folders"))
    }

    async fn find_root_folders(&self, tenant_id: TenantId, trashed: bool) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE tenant_id = $1 AND parent_id IS NULL AND trashed = $2 \
             ORDER BY pinned DESC, name ASC",
        )
        .bind(tenant_id)
        .bind(trashed)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to list root folders"))
    }

    async fn folder_name_exists(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        name: &str,
        exclude: Option<FolderId>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM folders \
             WHERE tenant_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND name = $3 \
             AND NOT trashed AND id IS DISTINCT FROM $4)",
        )
        .bind(tenant_id)
        .bind(parent_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to check folder name"))
    }

    async fn find_folders_by_flag(
        &self,
        tenant_id: TenantId,
        flag: NodeFlag,
    ) -> AppResult<Vec<Folder>> {
        let sql = format!(
            "SELECT * FROM folders WHERE tenant_id = $1 AND {} AND NOT trashed ORDER BY name ASC",
            flag.column()
        );
        sqlx::query_as::<_, Folder>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to list flagged folders"))
    }

    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, tenant_id, parent_id, name, storage_key) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(FolderId::new())
        .bind(data.tenant_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.storage_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("Failed to create folder '{}'", data.name)))
    }

    async fn update_folder(&self, folder: &Folder) -> AppResult<Folder> {
        if folder.parent_id == Some(folder.id) {
            return Err(AppError::not_allowed(format!(
                "Folder {} cannot be its own parent",
                folder.id
            )));
        }
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, name = $3, trashed = $4, pinned = $5, \
             frozen = $6, favorite = $7, shared = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(folder.id)
        .bind(folder.parent_id)
        .bind(&folder.name)
        .bind(folder.trashed)
        .bind(folder.pinned)
        .bind(folder.frozen)
        .bind(folder.favorite)
        .bind(folder.shared)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("Failed to update folder {}", folder.id)))?
        .ok_or_else(|| AppError::not_found(format!("Folder {} not found", folder.id)))
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Failed to delete folder"))?;
        Ok(())
    }
}
