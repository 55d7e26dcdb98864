//! CLI command definitions and dispatch.

pub mod drive;
pub mod migrate;
pub mod stats;
pub mod tenant;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use cloudtree_core::config::AppConfig;
use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::FolderId;
use cloudtree_database::DatabasePool;
use cloudtree_service::{QuotaLedger, StatisticsService, TenantService, TreeEngine};
use cloudtree_storage::open_byte_store;

use crate::output::OutputFormat;

/// CloudTree: multi-tenant hierarchical file storage
#[derive(Debug, Parser)]
#[command(name = "cloudtree", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from config/<env>.toml
    #[arg(short, long, env = "CLOUDTREE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Tenant lifecycle and quota
    Tenant(tenant::TenantArgs),
    /// Folder and file operations on behalf of a tenant
    Drive(drive::DriveArgs),
    /// Storage usage reports
    Stats(stats::StatsArgs),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        let db = DatabasePool::connect(&config.database).await?;
        if let Commands::Migrate(args) = &self.command {
            return migrate::execute(args, &db, self.format).await;
        }

        let runtime = Runtime::build(&config, &db).await?;
        match &self.command {
            Commands::Migrate(_) => Ok(()),
            Commands::Tenant(args) => tenant::execute(args, &runtime, self.format).await,
            Commands::Drive(args) => drive::execute(args, &runtime, self.format).await,
            Commands::Stats(args) => stats::execute(args, &runtime, self.format).await,
        }
    }
}

/// Services assembled from configuration for one CLI invocation.
#[derive(Debug)]
pub struct Runtime {
    /// Folder and file operations.
    pub engine: TreeEngine,
    /// Tenant lifecycle.
    pub tenants: TenantService,
    /// Usage reports.
    pub stats: StatisticsService,
}

impl Runtime {
    async fn build(config: &AppConfig, db: &DatabasePool) -> AppResult<Self> {
        let tree = db.tree_repository();
        let tenant_repo = db.tenant_repository();
        let store = open_byte_store(&config.storage).await?;
        let quota = Arc::new(QuotaLedger::new(tenant_repo.clone()));

        Ok(Self {
            engine: TreeEngine::new(tree.clone(), store.clone(), quota.clone(), &config.storage),
            tenants: TenantService::new(tenant_repo, tree.clone(), store, config.quota.clone()),
            stats: StatisticsService::new(tree, quota),
        })
    }
}

/// Parse an optional folder UUID argument.
pub fn parse_folder(value: Option<&str>) -> AppResult<Option<FolderId>> {
    value
        .map(|v| {
            v.parse::<FolderId>()
                .map_err(|e| AppError::validation(format!("Invalid folder ID '{v}': {e}")))
        })
        .transpose()
}
