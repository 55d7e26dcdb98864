//! Rename, move, flag toggles, sharing and restore.

use tracing::info;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::FolderId;
use cloudtree_entity::file::split_file_name;
use cloudtree_entity::{Node, NodeFlag, NodeId, ShareSettings};

use super::{TreeEngine, ensure_not_frozen, validate_name};
use crate::context::RequestContext;

impl TreeEngine {
    /// Change a node's display name. The storage key is left untouched.
    pub async fn rename(
        &self,
        _ctx: &RequestContext,
        id: NodeId,
        new_name: &str,
    ) -> AppResult<Node> {
        let new_name = validate_name(new_name)?;
        let mut node = self.nodes.get_active(id).await?;
        ensure_not_frozen(&node)?;

        match &mut node {
            Node::Folder(folder) => folder.name = new_name.clone(),
            Node::File(file) => {
                let (name, extension) = split_file_name(&new_name);
                file.name = name;
                file.extension = extension;
            }
        }

        if self.nodes.name_taken(&node, node.parent_id()).await? {
            return Err(AppError::already_exists(format!(
                "'{new_name}' already exists"
            )));
        }

        let saved = self.nodes.save(&node).await?;
        info!(node = %saved.id(), name = %new_name, "Node renamed");
        Ok(saved)
    }

    /// Reattach a node under `new_parent_id` (or the tenant root).
    ///
    /// Moves never cross tenants and never place a folder inside itself.
    pub async fn move_node(
        &self,
        _ctx: &RequestContext,
        id: NodeId,
        new_parent_id: Option<FolderId>,
    ) -> AppResult<Node> {
        let mut node = self.nodes.get_active(id).await?;
        ensure_not_frozen(&node)?;

        if let Some(parent_id) = new_parent_id {
            let parent = self.nodes.get_active_folder(parent_id).await?;
            if parent.tenant_id != node.tenant_id() {
                return Err(AppError::not_allowed(
                    "Nodes cannot be moved across tenants; share them instead",
                ));
            }
            if let NodeId::Folder(folder_id) = id {
                if self.nodes.is_within(parent_id, folder_id).await? {
                    return Err(AppError::not_allowed(
                        "A folder cannot be moved into itself or its descendants",
                    ));
                }
            }
        }

        if self.nodes.name_taken(&node, new_parent_id).await? {
            return Err(AppError::already_exists(format!(
                "'{}' already exists at the destination",
                node.display_name()
            )));
        }

        node.set_parent(new_parent_id);
        let saved = self.nodes.save(&node).await?;
        info!(node = %saved.id(), parent = ?new_parent_id, "Node moved");
        Ok(saved)
    }

    /// Flip one flag. Permitted on frozen nodes so freeze and pin can be
    /// undone.
    pub async fn toggle_flag(
        &self,
        _ctx: &RequestContext,
        id: NodeId,
        flag: NodeFlag,
    ) -> AppResult<Node> {
        let mut node = self.nodes.get_active(id).await?;
        let value = !node.flag(flag);
        node.set_flag(flag, value);
        let saved = self.nodes.save(&node).await?;
        info!(node = %saved.id(), flag = %flag, value, "Flag toggled");
        Ok(saved)
    }

    /// Apply share settings to a node and its whole subtree.
    pub async fn share(
        &self,
        _ctx: &RequestContext,
        id: NodeId,
        settings: ShareSettings,
    ) -> AppResult<Node> {
        let node = self.nodes.get_active(id).await?;
        ensure_not_frozen(&node)?;

        let shared = self.sharing.cascade_share(node, settings).await?;
        info!(
            node = %shared.id(),
            mode = %settings.access_mode,
            open = settings.open,
            "Share settings applied"
        );
        Ok(shared)
    }

    /// Bring a trashed node back to its original parent, or to the tenant
    /// root when that parent is gone.
    pub async fn restore(&self, _ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        self.trash.restore(id).await
    }
}
