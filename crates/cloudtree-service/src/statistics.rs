//! Storage usage reports.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use cloudtree_core::result::AppResult;
use cloudtree_core::types::TenantId;
use cloudtree_database::traits::{FileRepository, TreeRepository};
use cloudtree_entity::{Category, CategoryUsage, QuotaUsage};

use crate::quota::QuotaLedger;

/// Read-only reporting over the quota ledger and file records.
#[derive(Clone)]
pub struct StatisticsService {
    tree: Arc<dyn TreeRepository>,
    quota: Arc<QuotaLedger>,
}

impl std::fmt::Debug for StatisticsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsService").finish_non_exhaustive()
    }
}

impl StatisticsService {
    /// Creates a new statistics service.
    pub fn new(tree: Arc<dyn TreeRepository>, quota: Arc<QuotaLedger>) -> Self {
        Self { tree, quota }
    }

    /// Allocated, used and available bytes of a tenant.
    pub async fn usage(&self, tenant_id: TenantId) -> AppResult<QuotaUsage> {
        self.quota.usage(tenant_id).await
    }

    /// Bytes per extension category, one entry per category in
    /// [`Category::ALL`] order. Trashed files still occupy storage and are
    /// counted.
    pub async fn analyze(&self, tenant_id: TenantId) -> AppResult<Vec<CategoryUsage>> {
        // Fails with NotFound for unknown tenants.
        self.quota.usage(tenant_id).await?;

        let files = self.tree.find_files_by_tenant(tenant_id).await?;
        let mut totals: HashMap<Category, i64> = HashMap::new();
        for file in &files {
            *totals.entry(Category::of(&file.extension)).or_default() += file.size_bytes;
        }
        debug!(tenant_id = %tenant_id, files = files.len(), "Storage analyzed");

        Ok(Category::ALL
            .into_iter()
            .map(|category| CategoryUsage {
                category,
                bytes: totals.get(&category).copied().unwrap_or(0),
            })
            .collect())
    }
}
