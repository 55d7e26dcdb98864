//! Trash record queries.

use async_trait::async_trait;

use cloudtree_core::result::AppResult;
use cloudtree_core::types::{TenantId, TrashRecordId};
use cloudtree_entity::{CreateTrashRecord, NodeId, TrashRecord};

use super::{PgTreeRepository, map_read_error, map_write_error};
use crate::traits::TrashRepository;

#[async_trait]
impl TrashRepository for PgTreeRepository {
    async fn create_trash_record(&self, data: &CreateTrashRecord) -> AppResult<TrashRecord> {
        sqlx::query_as::<_, TrashRecord>(
            "INSERT INTO trash_records (id, tenant_id, target_kind, target_id, original_parent_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(TrashRecordId::new())
        .bind(data.tenant_id)
        .bind(data.target.kind())
        .bind(data.target.as_uuid())
        .bind(data.original_parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("Failed to trash {}", data.target)))
    }

    async fn find_trash_record(&self, target: NodeId) -> AppResult<Option<TrashRecord>> {
        sqlx::query_as::<_, TrashRecord>(
            "SELECT * FROM trash_records WHERE target_kind = $1 AND target_id = $2",
        )
        .bind(target.kind())
        .bind(target.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to find trash record"))
    }

    async fn delete_trash_record(&self, target: NodeId) -> AppResult<()> {
        sqlx::query("DELETE FROM trash_records WHERE target_kind = $1 AND target_id = $2")
            .bind(target.kind())
            .bind(target.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Failed to delete trash record"))?;
        Ok(())
    }

    async fn find_trash_records(&self, tenant_id: TenantId) -> AppResult<Vec<TrashRecord>> {
        sqlx::query_as::<_, TrashRecord>(
            "SELECT * FROM trash_records WHERE tenant_id = $1 ORDER BY trashed_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to list trash records"))
    }
}
