//! Share record queries.

use async_trait::async_trait;

use cloudtree_core::result::AppResult;
use cloudtree_core::types::{ShareRecordId, TenantId};
use cloudtree_entity::{NodeId, ShareRecord, ShareSettings};

use super::{PgTreeRepository, map_read_error, map_write_error};
use crate::traits::ShareRepository;

#[async_trait]
impl ShareRepository for PgTreeRepository {
    async fn find_share_record(&self, target: NodeId) -> AppResult<Option<ShareRecord>> {
        sqlx::query_as::<_, ShareRecord>(
            "SELECT * FROM share_records WHERE target_kind = $1 AND target_id = $2",
        )
        .bind(target.kind())
        .bind(target.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "Failed to find share record"))
    }

    async fn upsert_share_record(
        &self,
        tenant_id: TenantId,
        target: NodeId,
        settings: ShareSettings,
    ) -> AppResult<ShareRecord> {
        sqlx::query_as::<_, ShareRecord>(
            "INSERT INTO share_records (id, tenant_id, target_kind, target_id, access_mode, open) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (target_kind, target_id) DO UPDATE \
             SET access_mode = EXCLUDED.access_mode, open = EXCLUDED.open, updated_at = NOW() \
             RETURNING *",
        )
        .bind(ShareRecordId::new())
        .bind(tenant_id)
        .bind(target.kind())
        .bind(target.as_uuid())
        .bind(settings.access_mode)
        .bind(settings.open)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("Failed to share {target}")))
    }

    async fn delete_share_record(&self, target: NodeId) -> AppResult<()> {
        sqlx::query("DELETE FROM share_records WHERE target_kind = $1 AND target_id = $2")
            .bind(target.kind())
            .bind(target.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Failed to delete share record"))?;
        Ok(())
    }
}
