//! Trash manager: soft-delete and restore state transitions.
//!
//! ```text
//! Active --trash--> Trashed --restore--> Active
//!                   Trashed --purge----> Erased
//! ```

use tracing::info;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::{FolderId, TenantId};
use cloudtree_database::traits::{FolderRepository, TrashRepository};
use cloudtree_entity::{CreateTrashRecord, Node, NodeId};

use crate::nodes::NodeStore;

/// Detaches nodes into the trash and reattaches them on restore.
#[derive(Debug, Clone)]
pub struct TrashManager {
    nodes: NodeStore,
}

impl TrashManager {
    /// Creates a new trash manager.
    pub fn new(nodes: NodeStore) -> Self {
        Self { nodes }
    }

    /// Move an active node to the trash, remembering its parent. Trashing
    /// an already trashed node returns it unchanged.
    pub async fn trash(&self, node: Node) -> AppResult<Node> {
        if node.is_trashed() {
            return Ok(node);
        }
        if node.is_frozen() {
            return Err(AppError::frozen(format!("{} is frozen", node.id())));
        }

        let original_parent_id = node.parent_id();
        self.nodes
            .repository()
            .create_trash_record(&CreateTrashRecord {
                tenant_id: node.tenant_id(),
                target: node.id(),
                original_parent_id,
            })
            .await?;

        let mut detached = node;
        detached.set_parent(None);
        detached.set_trashed(true);
        let saved = self.nodes.save(&detached).await?;

        info!(
            node = %saved.id(),
            original_parent = ?original_parent_id,
            "Node moved to trash"
        );
        Ok(saved)
    }

    /// Bring a trashed node back. It returns to its original parent when
    /// that folder still exists, is active and does not lie inside the
    /// restored folder; otherwise to the tenant root. Restoring an active
    /// node returns it unchanged.
    pub async fn restore(&self, id: NodeId) -> AppResult<Node> {
        let node = self.nodes.get(id).await?;
        if !node.is_trashed() {
            return Ok(node);
        }

        let record = self.nodes.repository().find_trash_record(id).await?;
        let original_parent = record.and_then(|r| r.original_parent_id);
        let destination = self.resolve_destination(&node, original_parent).await?;

        if self.nodes.name_taken(&node, destination).await? {
            return Err(AppError::already_exists(format!(
                "'{}' already exists at the restore destination",
                node.display_name()
            )));
        }

        let mut restored = node;
        restored.set_trashed(false);
        restored.set_parent(destination);
        let saved = self.nodes.save(&restored).await?;
        self.nodes.repository().delete_trash_record(id).await?;

        info!(
            node = %saved.id(),
            parent = ?destination,
            fell_back_to_root = original_parent.is_some() && destination.is_none(),
            "Node restored from trash"
        );
        Ok(saved)
    }

    /// Drop the trash record of a trashed node and hand the node back for
    /// physical erasure.
    pub async fn purge(&self, id: NodeId) -> AppResult<Node> {
        let node = self.nodes.get(id).await?;
        if !node.is_trashed() {
            return Err(AppError::not_allowed(format!("{id} is not in the trash")));
        }
        self.nodes.repository().delete_trash_record(id).await?;
        Ok(node)
    }

    /// Trashed nodes of a tenant, most recently trashed first.
    pub async fn list(&self, tenant_id: TenantId) -> AppResult<Vec<Node>> {
        let records = self.nodes.repository().find_trash_records(tenant_id).await?;
        let mut nodes = Vec::with_capacity(records.len());
        for record in records {
            if let Some(node) = self.nodes.find(record.target()).await? {
                if node.is_trashed() {
                    nodes.push(node);
                }
            }
        }
        Ok(nodes)
    }

    async fn resolve_destination(
        &self,
        node: &Node,
        original_parent: Option<FolderId>,
    ) -> AppResult<Option<FolderId>> {
        let Some(parent_id) = original_parent else {
            return Ok(None);
        };
        let parent = match self.nodes.repository().find_folder(parent_id).await? {
            Some(parent) if !parent.trashed => parent,
            _ => return Ok(None),
        };
        // The old parent may have been moved below the trashed folder.
        if let Node::Folder(folder) = node {
            if self.nodes.is_within(parent.id, folder.id).await? {
                return Ok(None);
            }
        }
        Ok(Some(parent.id))
    }
}
