//! Storage usage reports.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use cloudtree_core::result::AppResult;

use super::Runtime;
use crate::output::{self, OutputFormat, human_bytes};

/// Arguments for stats commands
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Stats subcommand
    #[command(subcommand)]
    pub command: StatsCommand,
}

/// Stats subcommands
#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Allocated, used and available bytes
    Usage {
        /// Tenant name
        tenant: String,
    },
    /// Used bytes per file category
    Analyze {
        /// Tenant name
        tenant: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct UsageRow {
    allocated_bytes: i64,
    used_bytes: i64,
    available_bytes: i64,
    usage_percent: String,
}

#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    category: String,
    bytes: i64,
    size: String,
}

/// Execute stats commands.
pub async fn execute(args: &StatsArgs, rt: &Runtime, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        StatsCommand::Usage { tenant } => {
            let tenant = rt.tenants.find_by_name(tenant).await?;
            let usage = rt.stats.usage(tenant.id).await?;
            output::print_item(
                &UsageRow {
                    allocated_bytes: usage.allocated_bytes,
                    used_bytes: usage.used_bytes,
                    available_bytes: usage.available_bytes,
                    usage_percent: format!("{:.1}%", usage.usage_percent),
                },
                format,
            );
        }
        StatsCommand::Analyze { tenant } => {
            let tenant = rt.tenants.find_by_name(tenant).await?;
            let rows: Vec<CategoryRow> = rt
                .stats
                .analyze(tenant.id)
                .await?
                .into_iter()
                .map(|u| CategoryRow {
                    category: u.category.to_string(),
                    bytes: u.bytes,
                    size: human_bytes(u.bytes),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
