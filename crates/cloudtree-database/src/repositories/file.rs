//! File queries.

use async_trait::async_trait;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::{FileId, FolderId, StorageKey, TenantId};
use cloudtree_entity::{CreateFile, File, NodeFlag};

use super::{PgTreeRepository, map_read_error, map_write_error};
use crate::traits::FileRepository;

#[async_trait]
impl FileRepository for PgTreeRepository {
    async fn find_file(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to find file"))
    }

    async fn find_file_by_storage_key(&self, key: &StorageKey) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE storage_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to find file by storage key"))
    }

    async fn find_child_files(&self, parent_id: FolderId, trashed: bool) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE parent_id = $1 AND trashed = $2 \
             ORDER BY pinned DESC, name ASC, extension ASC",
        )
        .bind(parent_id)
        .bind(trashed)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to list child files"))
    }

    async fn find_root_files(&self, tenant_id: TenantId, trashed: bool) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE tenant_id = $1 AND parent_id IS NULL AND trashed = $2 \
             ORDER BY pinned DESC, name ASC, extension ASC",
        )
        .bind(tenant_id)
        .bind(trashed)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to list root files"))
    }

    async fn find_files_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to list tenant files"))
    }

    async fn file_name_exists(
        &self,
        tenant_id: TenantId,
        parent_id: Option<FolderId>,
        name: &str,
        extension: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM files \
             WHERE tenant_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             AND name = $3 AND extension = $4 \
             AND NOT trashed AND id IS DISTINCT FROM $5)",
        )
        .bind(tenant_id)
        .bind(parent_id)
        .bind(name)
        .bind(extension)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to check file name"))
    }

    async fn find_files_by_flag(&self, tenant_id: TenantId, flag: NodeFlag) -> AppResult<Vec<File>> {
        let sql = format!(
            "SELECT * FROM files WHERE tenant_id = $1 AND {} AND NOT trashed \
             ORDER BY name ASC, extension ASC",
            flag.column()
        );
        sqlx::query_as::<_, File>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to list flagged files"))
    }

    async fn create_file(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (id, tenant_id, parent_id, name, extension, size_bytes, storage_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(FileId::new())
        .bind(data.tenant_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.extension)
        .bind(data.size_bytes)
        .bind(&data.storage_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                &format!("Failed to create file '{}{}'", data.name, data.extension),
            )
        })
    }

    async fn update_file(&self, file: &File) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET parent_id = $2, name = $3, extension = $4, trashed = $5, \
             pinned = $6, frozen = $7, favorite = $8, shared = $9, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(file.id)
        .bind(file.parent_id)
        .bind(&file.name)
        .bind(&file.extension)
        .bind(file.trashed)
        .bind(file.pinned)
        .bind(file.frozen)
        .bind(file.favorite)
        .bind(file.shared)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("Failed to update file {}", file.id)))?
        .ok_or_else(|| AppError::not_found(format!("File {} not found", file.id)))
    }

    async fn delete_file(&self, id: FileId) -> AppResult<()> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Failed to delete file"))?;
        Ok(())
    }
}
