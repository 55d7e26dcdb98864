//! Two-phase delete: trash first, erase on the second call.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use tracing::info;

use cloudtree_core::result::AppResult;
use cloudtree_database::traits::{FileRepository, FolderRepository, ShareRepository};
use cloudtree_entity::{File, Folder, Node, NodeFlag, NodeId};

use super::{TreeEngine, ensure_not_frozen};
use crate::context::RequestContext;

/// What a delete call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "node", rename_all = "lowercase")]
pub enum DeleteOutcome {
    /// The node was active and now sits in the trash.
    Trashed(Node),
    /// The node was already trashed and has been erased with its subtree.
    Erased(Node),
}

impl DeleteOutcome {
    /// The node the outcome refers to.
    pub fn node(&self) -> &Node {
        match self {
            Self::Trashed(node) | Self::Erased(node) => node,
        }
    }
}

impl TreeEngine {
    /// Delete a node.
    ///
    /// An active node moves to the trash. A trashed node is unpinned,
    /// loses its trash record, and is erased together with every
    /// descendant: contents are removed from the byte store and released
    /// from the quota ledger file by file.
    pub async fn delete(&self, _ctx: &RequestContext, id: NodeId) -> AppResult<DeleteOutcome> {
        let node = self.nodes.get(id).await?;
        ensure_not_frozen(&node)?;

        if !node.is_trashed() {
            let trashed = self.trash.trash(node).await?;
            return Ok(DeleteOutcome::Trashed(trashed));
        }

        let mut node = node;
        if node.flag(NodeFlag::Pinned) {
            node.set_flag(NodeFlag::Pinned, false);
            node = self.nodes.save(&node).await?;
        }
        self.trash.purge(id).await?;

        match &node {
            Node::Folder(folder) => self.erase_folder(folder.clone()).await?,
            Node::File(file) => self.erase_file(file).await?,
        }
        info!(node = %id, "Node erased");
        Ok(DeleteOutcome::Erased(node))
    }

    fn erase_folder<'a>(&'a self, folder: Folder) -> BoxFuture<'a, AppResult<()>> {
        async move {
            let children = self.nodes.children(folder.id, false).await?;
            for file in &children.files {
                self.erase_file(file).await?;
            }
            for child in children.folders {
                self.erase_folder(child).await?;
            }

            let repo = self.nodes.repository();
            repo.delete_share_record(NodeId::Folder(folder.id)).await?;
            repo.delete_folder(folder.id).await?;
            Ok(())
        }
        .boxed()
    }

    async fn erase_file(&self, file: &File) -> AppResult<()> {
        self.store.delete(&file.storage_key).await?;

        let repo = self.nodes.repository();
        repo.delete_share_record(NodeId::File(file.id)).await?;
        repo.delete_file(file.id).await?;

        self.quota.release(file.tenant_id, file.size_bytes).await;
        Ok(())
    }
}
