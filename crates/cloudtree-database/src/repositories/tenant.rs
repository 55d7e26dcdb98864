//! Tenant and quota ledger queries.

use async_trait::async_trait;
use sqlx::PgPool;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::TenantId;
use cloudtree_entity::{CreateTenant, Tenant, UsageAdjustment};

use super::{map_read_error, map_write_error};
use crate::traits::TenantRepository;

/// Repository for tenants and their used-bytes counters.
#[derive(Debug, Clone)]
pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    /// Create a new tenant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_tenant(&self, id: TenantId) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to find tenant"))
    }

    async fn find_tenant_by_name(&self, name: &str) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Failed to find tenant by name"))
    }

    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name, allocated_bytes) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(TenantId::new())
        .bind(&data.name)
        .bind(data.allocated_bytes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("Failed to create tenant '{}'", data.name)))
    }

    async fn update_tenant(&self, tenant: &Tenant) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET name = $2, allocated_bytes = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(tenant.allocated_bytes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("Failed to update tenant {}", tenant.id)))?
        .ok_or_else(|| AppError::not_found(format!("Tenant {} not found", tenant.id)))
    }

    async fn delete_tenant(&self, id: TenantId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Failed to delete tenant"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Tenant {id} not found")));
        }
        Ok(())
    }

    async fn adjust_used_bytes(&self, id: TenantId, delta: i64) -> AppResult<UsageAdjustment> {
        let row: Option<(i64, bool)> = sqlx::query_as(
            "WITH prev AS (SELECT used_bytes FROM tenants WHERE id = $1 FOR UPDATE) \
             UPDATE tenants t SET used_bytes = GREATEST(prev.used_bytes + $2, 0), \
             updated_at = NOW() FROM prev WHERE t.id = $1 \
             RETURNING t.used_bytes, (prev.used_bytes + $2) < 0",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to adjust used bytes"))?;

        let (used_bytes, clamped) =
            row.ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))?;
        Ok(UsageAdjustment {
            used_bytes,
            clamped,
        })
    }
}
