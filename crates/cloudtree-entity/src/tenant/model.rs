//! Tenant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudtree_core::types::TenantId;

use super::quota::QuotaUsage;

/// An isolated owner of a subtree and a storage quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: TenantId,
    /// Unique display name.
    pub name: String,
    /// Capacity granted to the tenant.
    pub allocated_bytes: i64,
    /// Bytes currently charged against the allocation. Never negative.
    pub used_bytes: i64,
    /// When the tenant was provisioned.
    pub created_at: DateTime<Utc>,
    /// When the tenant was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Snapshot of the tenant's quota.
    pub fn quota(&self) -> QuotaUsage {
        QuotaUsage::new(self.allocated_bytes, self.used_bytes)
    }
}

/// Data required to provision a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Unique display name.
    pub name: String,
    /// Capacity granted to the tenant.
    pub allocated_bytes: i64,
}
