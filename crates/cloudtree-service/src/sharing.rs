//! Sharing manager: recursive share configuration and access decisions.

use futures::FutureExt;
use futures::future::BoxFuture;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_database::traits::ShareRepository;
use cloudtree_entity::{AccessMode, Node, NodeId, ShareAction, ShareSettings};

use crate::context::RequestContext;
use crate::nodes::NodeStore;

/// Maintains per-node share records and answers access questions.
///
/// Every node carries its own record; [`SharingManager::cascade_share`]
/// keeps descendants consistent on write, so reads never walk ancestors.
#[derive(Debug, Clone)]
pub struct SharingManager {
    nodes: NodeStore,
}

impl SharingManager {
    /// Creates a new sharing manager.
    pub fn new(nodes: NodeStore) -> Self {
        Self { nodes }
    }

    /// Mode recorded on the target's own share record, if any.
    pub async fn resolve_access(&self, target: NodeId) -> AppResult<Option<AccessMode>> {
        Ok(self
            .nodes
            .repository()
            .find_share_record(target)
            .await?
            .map(|record| record.access_mode))
    }

    /// Mode granted to requesters outside the owning tenant: the recorded
    /// mode when the record is open, nothing otherwise.
    pub async fn external_access(&self, target: NodeId) -> AppResult<Option<AccessMode>> {
        Ok(self
            .nodes
            .repository()
            .find_share_record(target)
            .await?
            .filter(|record| record.open)
            .map(|record| record.access_mode))
    }

    /// Upsert the share record of a single node and mirror `open` onto its
    /// `shared` flag.
    pub async fn share(&self, node: Node, settings: ShareSettings) -> AppResult<Node> {
        self.nodes
            .repository()
            .upsert_share_record(node.tenant_id(), node.id(), settings)
            .await?;
        if node.is_shared() == settings.open {
            return Ok(node);
        }
        let mut updated = node;
        updated.set_shared(settings.open);
        self.nodes.save(&updated).await
    }

    /// Share `root` and every active descendant with the same settings,
    /// depth first. Earlier writes stay in place if a later one fails.
    pub fn cascade_share<'a>(
        &'a self,
        root: Node,
        settings: ShareSettings,
    ) -> BoxFuture<'a, AppResult<Node>> {
        async move {
            let shared = self.share(root, settings).await?;
            if let Node::Folder(folder) = &shared {
                let children = self.nodes.children(folder.id, false).await?;
                for file in children.files {
                    self.share(Node::File(file), settings).await?;
                }
                for child in children.folders {
                    self.cascade_share(Node::Folder(child), settings).await?;
                }
            }
            Ok(shared)
        }
        .boxed()
    }

    /// Decide whether the requester may perform `action` on `node`.
    ///
    /// Members of the owning tenant always may. Anyone else needs an open
    /// share record whose mode permits the action.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        node: &Node,
        action: ShareAction,
    ) -> AppResult<()> {
        if ctx.owns(node.tenant_id()) {
            return Ok(());
        }
        match self.external_access(node.id()).await? {
            Some(mode) if mode.permits(action) => Ok(()),
            Some(mode) => Err(AppError::not_allowed(format!(
                "{} is shared with {mode} access only",
                node.id()
            ))),
            None => Err(AppError::not_allowed(format!("{} is not shared", node.id()))),
        }
    }
}
