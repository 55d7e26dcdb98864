//! Tenant lifecycle CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use cloudtree_core::result::AppResult;
use cloudtree_entity::Tenant;

use super::Runtime;
use crate::output::{self, OutputFormat, human_bytes};

/// Arguments for tenant commands
#[derive(Debug, Args)]
pub struct TenantArgs {
    /// Tenant subcommand
    #[command(subcommand)]
    pub command: TenantCommand,
}

/// Tenant subcommands
#[derive(Debug, Subcommand)]
pub enum TenantCommand {
    /// Provision a tenant
    Create {
        /// Unique tenant name
        name: String,
        /// Allocated bytes (defaults to quota.default_allocated_bytes)
        #[arg(short, long)]
        quota: Option<i64>,
    },
    /// Show a tenant
    Show {
        /// Tenant name
        name: String,
    },
    /// Rename a tenant
    Rename {
        /// Current tenant name
        name: String,
        /// New tenant name
        new_name: String,
    },
    /// Change a tenant's allocation
    Quota {
        /// Tenant name
        name: String,
        /// Allocated bytes
        bytes: i64,
    },
    /// Delete a tenant and everything it stores
    Delete {
        /// Tenant name
        name: String,
    },
}

/// Tenant display row
#[derive(Debug, Serialize, Tabled)]
struct TenantRow {
    id: String,
    name: String,
    allocated: String,
    used: String,
    created_at: String,
}

impl From<&Tenant> for TenantRow {
    fn from(t: &Tenant) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.clone(),
            allocated: human_bytes(t.allocated_bytes),
            used: human_bytes(t.used_bytes),
            created_at: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute tenant commands.
pub async fn execute(args: &TenantArgs, rt: &Runtime, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        TenantCommand::Create { name, quota } => {
            let tenant = rt.tenants.provision(name, *quota).await?;
            output::print_item(&TenantRow::from(&tenant), format);
        }
        TenantCommand::Show { name } => {
            let tenant = rt.tenants.find_by_name(name).await?;
            output::print_item(&TenantRow::from(&tenant), format);
        }
        TenantCommand::Rename { name, new_name } => {
            let tenant = rt.tenants.find_by_name(name).await?;
            let tenant = rt.tenants.rename(tenant.id, new_name).await?;
            output::print_success(&format!("Tenant renamed to '{}'", tenant.name));
        }
        TenantCommand::Quota { name, bytes } => {
            let tenant = rt.tenants.find_by_name(name).await?;
            let tenant = rt.tenants.set_allocation(tenant.id, *bytes).await?;
            if tenant.used_bytes > tenant.allocated_bytes {
                output::print_warning("Allocation is below current usage; writes will be refused");
            }
            output::print_item(&TenantRow::from(&tenant), format);
        }
        TenantCommand::Delete { name } => {
            let tenant = rt.tenants.find_by_name(name).await?;
            rt.tenants.remove(tenant.id).await?;
            output::print_success(&format!("Tenant '{}' deleted", tenant.name));
        }
    }
    Ok(())
}
