//! Tenant lifecycle: provisioning, renaming, allocation changes and removal.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use cloudtree_core::config::QuotaConfig;
use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::traits::storage::ByteStore;
use cloudtree_core::types::TenantId;
use cloudtree_database::traits::{FileRepository, TenantRepository, TreeRepository};
use cloudtree_entity::{CreateTenant, Tenant};

/// Provisions and removes tenants.
#[derive(Clone)]
pub struct TenantService {
    tenants: Arc<dyn TenantRepository>,
    tree: Arc<dyn TreeRepository>,
    store: Arc<dyn ByteStore>,
    config: QuotaConfig,
}

impl std::fmt::Debug for TenantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TenantService {
    /// Creates a new tenant service.
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        tree: Arc<dyn TreeRepository>,
        store: Arc<dyn ByteStore>,
        config: QuotaConfig,
    ) -> Self {
        Self {
            tenants,
            tree,
            store,
            config,
        }
    }

    /// Create a tenant with an empty ledger. Without an explicit
    /// allocation the configured default applies.
    pub async fn provision(&self, name: &str, allocated_bytes: Option<i64>) -> AppResult<Tenant> {
        let name = validate_tenant_name(name)?;
        let allocated_bytes = allocated_bytes.unwrap_or(self.config.default_allocated_bytes);
        validate_allocation(allocated_bytes)?;

        if self.tenants.find_tenant_by_name(&name).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "Tenant '{name}' already exists"
            )));
        }

        let tenant = self
            .tenants
            .create_tenant(&CreateTenant {
                name,
                allocated_bytes,
            })
            .await?;

        info!(
            tenant_id = %tenant.id,
            name = %tenant.name,
            allocated_bytes,
            "Tenant provisioned"
        );
        Ok(tenant)
    }

    /// Find a tenant by ID.
    pub async fn get(&self, id: TenantId) -> AppResult<Tenant> {
        self.tenants
            .find_tenant(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))
    }

    /// Find a tenant by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Tenant> {
        self.tenants
            .find_tenant_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant '{}' not found", name.trim())))
    }

    /// Give a tenant a new unique name.
    pub async fn rename(&self, id: TenantId, new_name: &str) -> AppResult<Tenant> {
        let new_name = validate_tenant_name(new_name)?;
        let mut tenant = self.get(id).await?;
        if tenant.name == new_name {
            return Ok(tenant);
        }
        if let Some(other) = self.tenants.find_tenant_by_name(&new_name).await? {
            if other.id != id {
                return Err(AppError::already_exists(format!(
                    "Tenant '{new_name}' already exists"
                )));
            }
        }

        let old_name = std::mem::replace(&mut tenant.name, new_name);
        tenant.updated_at = Utc::now();
        let tenant = self.tenants.update_tenant(&tenant).await?;
        info!(tenant_id = %id, old = %old_name, new = %tenant.name, "Tenant renamed");
        Ok(tenant)
    }

    /// Change a tenant's allocation. Shrinking below current usage is
    /// accepted; later writes are then refused until usage drops.
    pub async fn set_allocation(&self, id: TenantId, allocated_bytes: i64) -> AppResult<Tenant> {
        validate_allocation(allocated_bytes)?;
        let mut tenant = self.get(id).await?;
        tenant.allocated_bytes = allocated_bytes;
        tenant.updated_at = Utc::now();
        let tenant = self.tenants.update_tenant(&tenant).await?;

        if tenant.used_bytes > tenant.allocated_bytes {
            warn!(
                tenant_id = %id,
                used_bytes = tenant.used_bytes,
                allocated_bytes,
                "Allocation is below current usage"
            );
        }
        info!(tenant_id = %id, allocated_bytes, "Tenant allocation changed");
        Ok(tenant)
    }

    /// Erase every stored byte of the tenant, then delete the tenant and
    /// all of its records.
    pub async fn remove(&self, id: TenantId) -> AppResult<()> {
        let tenant = self.get(id).await?;
        let files = self.tree.find_files_by_tenant(id).await?;
        for file in &files {
            self.store.delete(&file.storage_key).await?;
        }
        self.tenants.delete_tenant(id).await?;

        info!(
            tenant_id = %id,
            name = %tenant.name,
            files = files.len(),
            "Tenant removed"
        );
        Ok(())
    }
}

fn validate_tenant_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Tenant name cannot be empty"));
    }
    if trimmed.len() > 255 {
        return Err(AppError::validation(
            "Tenant name must be at most 255 characters",
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_allocation(allocated_bytes: i64) -> AppResult<()> {
    if allocated_bytes < 0 {
        return Err(AppError::validation("Allocation cannot be negative"));
    }
    Ok(())
}
