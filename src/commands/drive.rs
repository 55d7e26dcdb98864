//! Folder and file commands run on behalf of one tenant.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use futures::StreamExt;
use serde::Serialize;
use tabled::Tabled;
use tokio::io::AsyncWriteExt;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::FileId;
use cloudtree_entity::{AccessMode, File, Node, NodeFlag, NodeId, ShareAction, ShareSettings};
use cloudtree_service::{DeleteOutcome, FileUpload, RequestContext};

use super::{Runtime, parse_folder};
use crate::output::{self, OutputFormat, human_bytes};

/// Arguments for drive commands
#[derive(Debug, Args)]
pub struct DriveArgs {
    /// Name of the tenant the commands run as
    #[arg(short, long, env = "CLOUDTREE_TENANT")]
    pub tenant: String,

    /// Drive subcommand
    #[command(subcommand)]
    pub command: DriveCommand,
}

/// Drive subcommands. Nodes are addressed as `folder:<uuid>` or `file:<uuid>`.
#[derive(Debug, Subcommand)]
pub enum DriveCommand {
    /// List a folder (or the root)
    Ls {
        /// Folder ID
        folder: Option<String>,
    },
    /// Create a folder
    Mkdir {
        /// Folder name
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Upload local files in one batch
    Upload {
        /// Local file paths
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Download a file
    Download {
        /// File ID
        file: String,
        /// Output path (defaults to the file's name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rename a node
    Rename {
        /// Node ID
        node: String,
        /// New name
        name: String,
    },
    /// Move a node
    Mv {
        /// Node ID
        node: String,
        /// Destination folder ID (omit for root)
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Copy a node and its subtree
    Cp {
        /// Node ID
        node: String,
        /// Destination folder ID (omit for root)
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Move a node to the trash, or erase it if already trashed
    Rm {
        /// Node ID
        node: String,
    },
    /// Restore a trashed node
    Restore {
        /// Node ID
        node: String,
    },
    /// List the trash
    Trash,
    /// Toggle the favorite flag
    Favorite {
        /// Node ID
        node: String,
    },
    /// Toggle the pinned flag
    Pin {
        /// Node ID
        node: String,
    },
    /// Toggle the frozen flag
    Freeze {
        /// Node ID
        node: String,
    },
    /// List nodes with a flag set (favorite, pinned, frozen)
    Flagged {
        /// Flag name
        flag: String,
    },
    /// Configure sharing on a node and its subtree
    Share {
        /// Node ID
        node: String,
        /// Access mode granted (read or edit)
        #[arg(short, long, default_value = "read")]
        mode: String,
        /// Record the settings without opening the node to other tenants
        #[arg(long)]
        closed: bool,
    },
}

/// Node display row
#[derive(Debug, Serialize, Tabled)]
struct NodeRow {
    id: String,
    name: String,
    size: String,
    flags: String,
    shared: bool,
    updated_at: String,
}

impl From<&Node> for NodeRow {
    fn from(node: &Node) -> Self {
        let (size, updated_at) = match node {
            Node::Folder(f) => ("-".to_string(), f.updated_at),
            Node::File(f) => (human_bytes(f.size_bytes), f.updated_at),
        };
        let flags: Vec<&str> = [NodeFlag::Pinned, NodeFlag::Favorite, NodeFlag::Frozen]
            .into_iter()
            .filter(|flag| node.flag(*flag))
            .map(|flag| flag.column())
            .collect();
        Self {
            id: node.id().to_string(),
            name: node.display_name(),
            size,
            flags: flags.join(","),
            shared: node.is_shared(),
            updated_at: updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn rows(nodes: &[Node]) -> Vec<NodeRow> {
    nodes.iter().map(NodeRow::from).collect()
}

fn parse_node(value: &str) -> AppResult<NodeId> {
    value.parse()
}

/// Execute drive commands.
pub async fn execute(args: &DriveArgs, rt: &Runtime, format: OutputFormat) -> AppResult<()> {
    let tenant = rt.tenants.find_by_name(&args.tenant).await?;
    let ctx = RequestContext::new(tenant.id);
    let engine = &rt.engine;

    match &args.command {
        DriveCommand::Ls { folder } => {
            let listing = engine.list(&ctx, parse_folder(folder.as_deref())?).await?;
            let nodes: Vec<Node> = listing
                .folders
                .into_iter()
                .map(Node::Folder)
                .chain(listing.files.into_iter().map(Node::File))
                .collect();
            if format == OutputFormat::Table {
                output::print_kv("access", listing.access.as_str());
            }
            output::print_list(&rows(&nodes), format);
        }
        DriveCommand::Mkdir { name, parent } => {
            let parent = parse_folder(parent.as_deref())?;
            authorize_parent(rt, &ctx, parent.map(NodeId::Folder)).await?;
            let folder = engine.create_folder(&ctx, parent, name).await?;
            output::print_item(&NodeRow::from(&Node::Folder(folder)), format);
        }
        DriveCommand::Upload { paths, parent } => {
            let parent = parse_folder(parent.as_deref())?;
            authorize_parent(rt, &ctx, parent.map(NodeId::Folder)).await?;
            let mut uploads = Vec::with_capacity(paths.len());
            for path in paths {
                uploads.push(FileUpload::new(local_name(path)?, tokio::fs::read(path).await?));
            }
            let files = engine.upload(&ctx, parent, uploads).await?;
            let nodes: Vec<Node> = files.into_iter().map(Node::File).collect();
            output::print_list(&rows(&nodes), format);
        }
        DriveCommand::Download { file, output: out } => {
            let id = parse_node(file)?;
            let NodeId::File(file_id) = id else {
                return Err(AppError::validation(format!("{id} is not a file")));
            };
            engine.authorize(&ctx, id, ShareAction::Read).await?;
            let (file, path) = download(rt, &ctx, file_id, out.as_deref()).await?;
            output::print_success(&format!(
                "Downloaded {} to {}",
                file.display_name(),
                path.display()
            ));
        }
        DriveCommand::Rename { node, name } => {
            let id = parse_node(node)?;
            engine.authorize(&ctx, id, ShareAction::Write).await?;
            let node = engine.rename(&ctx, id, name).await?;
            output::print_item(&NodeRow::from(&node), format);
        }
        DriveCommand::Mv { node, to } => {
            let id = parse_node(node)?;
            let to = parse_folder(to.as_deref())?;
            engine.authorize(&ctx, id, ShareAction::Write).await?;
            authorize_parent(rt, &ctx, to.map(NodeId::Folder)).await?;
            let node = engine.move_node(&ctx, id, to).await?;
            output::print_item(&NodeRow::from(&node), format);
        }
        DriveCommand::Cp { node, to } => {
            let id = parse_node(node)?;
            let to = parse_folder(to.as_deref())?;
            engine.authorize(&ctx, id, ShareAction::Read).await?;
            authorize_parent(rt, &ctx, to.map(NodeId::Folder)).await?;
            let node = engine.copy(&ctx, id, to).await?;
            output::print_item(&NodeRow::from(&node), format);
        }
        DriveCommand::Rm { node } => {
            let id = parse_node(node)?;
            engine.authorize(&ctx, id, ShareAction::Write).await?;
            match engine.delete(&ctx, id).await? {
                DeleteOutcome::Trashed(node) => {
                    output::print_success(&format!("'{}' moved to trash", node.display_name()));
                }
                DeleteOutcome::Erased(node) => {
                    output::print_success(&format!("'{}' erased", node.display_name()));
                }
            }
        }
        DriveCommand::Restore { node } => {
            let id = parse_node(node)?;
            engine.authorize(&ctx, id, ShareAction::Write).await?;
            let node = engine.restore(&ctx, id).await?;
            output::print_item(&NodeRow::from(&node), format);
        }
        DriveCommand::Trash => {
            let nodes = engine.list_trash(&ctx).await?;
            output::print_list(&rows(&nodes), format);
        }
        DriveCommand::Favorite { node } => {
            toggle(rt, &ctx, node, NodeFlag::Favorite, format).await?;
        }
        DriveCommand::Pin { node } => {
            toggle(rt, &ctx, node, NodeFlag::Pinned, format).await?;
        }
        DriveCommand::Freeze { node } => {
            toggle(rt, &ctx, node, NodeFlag::Frozen, format).await?;
        }
        DriveCommand::Flagged { flag } => {
            let nodes = engine.list_flagged(&ctx, flag.parse()?).await?;
            output::print_list(&rows(&nodes), format);
        }
        DriveCommand::Share { node, mode, closed } => {
            let id = parse_node(node)?;
            engine.authorize(&ctx, id, ShareAction::Write).await?;
            let settings = ShareSettings {
                access_mode: mode.parse::<AccessMode>()?,
                open: !closed,
            };
            let node = engine.share(&ctx, id, settings).await?;
            output::print_item(&NodeRow::from(&node), format);
        }
    }
    Ok(())
}

async fn authorize_parent(
    rt: &Runtime,
    ctx: &RequestContext,
    parent: Option<NodeId>,
) -> AppResult<()> {
    if let Some(id) = parent {
        rt.engine.authorize(ctx, id, ShareAction::Write).await?;
    }
    Ok(())
}

async fn toggle(
    rt: &Runtime,
    ctx: &RequestContext,
    node: &str,
    flag: NodeFlag,
    format: OutputFormat,
) -> AppResult<()> {
    let id = parse_node(node)?;
    rt.engine.authorize(ctx, id, ShareAction::Write).await?;
    let node = rt.engine.toggle_flag(ctx, id, flag).await?;
    output::print_item(&NodeRow::from(&node), format);
    Ok(())
}

async fn download(
    rt: &Runtime,
    ctx: &RequestContext,
    id: FileId,
    out: Option<&Path>,
) -> AppResult<(File, PathBuf)> {
    let (file, mut stream) = rt.engine.open_file(ctx, id).await?;
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(file.display_name()));
    let mut target = tokio::fs::File::create(&path).await?;
    while let Some(chunk) = stream.next().await {
        target.write_all(&chunk?).await?;
    }
    target.flush().await?;
    Ok((file, path))
}

fn local_name(path: &Path) -> AppResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(format!("'{}' has no file name", path.display())))
}
