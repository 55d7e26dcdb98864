//! Quota ledger: allocated versus used bytes per tenant.

use std::sync::Arc;

use tracing::{info, warn};

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::TenantId;
use cloudtree_database::traits::TenantRepository;
use cloudtree_entity::QuotaUsage;

/// Tracks used bytes incrementally; never derives usage from a tree scan.
#[derive(Clone)]
pub struct QuotaLedger {
    tenants: Arc<dyn TenantRepository>,
}

impl std::fmt::Debug for QuotaLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaLedger").finish_non_exhaustive()
    }
}

impl QuotaLedger {
    /// Creates a new quota ledger.
    pub fn new(tenants: Arc<dyn TenantRepository>) -> Self {
        Self { tenants }
    }

    /// Current allocation and usage of a tenant.
    pub async fn usage(&self, tenant_id: TenantId) -> AppResult<QuotaUsage> {
        let tenant = self
            .tenants
            .find_tenant(tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant {tenant_id} not found")))?;
        Ok(tenant.quota())
    }

    /// True iff `used + additional <= allocated`.
    pub async fn check_capacity(&self, tenant_id: TenantId, additional_bytes: i64) -> AppResult<bool> {
        Ok(!self.usage(tenant_id).await?.would_exceed(additional_bytes))
    }

    /// Fail with `QuotaExceeded` unless `additional_bytes` still fit.
    pub async fn ensure_capacity(&self, tenant_id: TenantId, additional_bytes: i64) -> AppResult<()> {
        let usage = self.usage(tenant_id).await?;
        if usage.would_exceed(additional_bytes) {
            return Err(AppError::quota_exceeded(format!(
                "Tenant {tenant_id} cannot store {additional_bytes} more bytes \
                 ({} of {} used)",
                usage.used_bytes, usage.allocated_bytes
            )));
        }
        Ok(())
    }

    /// Apply a signed delta and return the new used bytes. A result that
    /// would go negative is clamped to zero and logged.
    pub async fn adjust_usage(&self, tenant_id: TenantId, delta_bytes: i64) -> AppResult<i64> {
        let adjustment = self.tenants.adjust_used_bytes(tenant_id, delta_bytes).await?;
        if adjustment.clamped {
            warn!(
                tenant_id = %tenant_id,
                delta_bytes,
                "Quota ledger would go negative; clamped to zero"
            );
        }
        Ok(adjustment.used_bytes)
    }

    /// Decrement usage after bytes were erased. Ledger failures are logged
    /// and swallowed so erasure always completes.
    pub async fn release(&self, tenant_id: TenantId, bytes: i64) {
        match self.adjust_usage(tenant_id, -bytes).await {
            Ok(used_bytes) => info!(tenant_id = %tenant_id, bytes, used_bytes, "Quota released"),
            Err(e) => warn!(
                tenant_id = %tenant_id,
                bytes,
                error = %e,
                "Failed to release quota"
            ),
        }
    }
}
