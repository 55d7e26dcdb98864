//! Tree engine: structural operations over a tenant's folders and files.
//!
//! The engine owns its collaborators (repository, byte store, quota
//! ledger, trash and sharing managers) and is the only component that
//! composes them. Every operation validates existence, frozen state,
//! sibling names and quota before it mutates anything. Recursive
//! operations commit node by node and are not rolled back on a later
//! failure.

pub mod copy;
pub mod delete;
pub mod ingest;
pub mod listing;
pub mod structure;

use std::sync::Arc;

use cloudtree_core::config::StorageConfig;
use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::traits::storage::ByteStore;
use cloudtree_core::types::{FolderId, TenantId};
use cloudtree_database::traits::TreeRepository;
use cloudtree_entity::{AccessMode, File, Folder, Node, NodeId, ShareAction};

use crate::context::RequestContext;
use crate::nodes::NodeStore;
use crate::quota::QuotaLedger;
use crate::sharing::SharingManager;
use crate::trash::TrashManager;

pub use delete::DeleteOutcome;
pub use ingest::FileUpload;
pub use listing::Listing;

/// Suffix appended to a copy created next to its source.
pub const COPY_SUFFIX: &str = "_(copy)";

/// Orchestrates create, rename, move, copy, delete, list, flag and share.
#[derive(Clone)]
pub struct TreeEngine {
    nodes: NodeStore,
    store: Arc<dyn ByteStore>,
    quota: Arc<QuotaLedger>,
    trash: Arc<TrashManager>,
    sharing: Arc<SharingManager>,
    max_upload_size_bytes: u64,
}

impl std::fmt::Debug for TreeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeEngine")
            .field("store", &self.store)
            .field("max_upload_size_bytes", &self.max_upload_size_bytes)
            .finish_non_exhaustive()
    }
}

impl TreeEngine {
    /// Creates a new tree engine.
    pub fn new(
        tree: Arc<dyn TreeRepository>,
        store: Arc<dyn ByteStore>,
        quota: Arc<QuotaLedger>,
        storage: &StorageConfig,
    ) -> Self {
        let nodes = NodeStore::new(tree);
        Self {
            trash: Arc::new(TrashManager::new(nodes.clone())),
            sharing: Arc::new(SharingManager::new(nodes.clone())),
            nodes,
            store,
            quota,
            max_upload_size_bytes: storage.max_upload_size_bytes,
        }
    }

    /// The sharing manager, for the boundary layer's access decisions.
    pub fn sharing(&self) -> &SharingManager {
        &self.sharing
    }

    /// The quota ledger the engine charges.
    pub fn quota(&self) -> &QuotaLedger {
        &self.quota
    }

    /// Look up a node in any state.
    pub async fn get(&self, id: NodeId) -> AppResult<Node> {
        self.nodes.get(id).await
    }

    /// Load a node and check that the requester may perform `action` on it.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        action: ShareAction,
    ) -> AppResult<Node> {
        let node = self.nodes.get(id).await?;
        self.sharing.authorize(ctx, &node, action).await?;
        Ok(node)
    }

    /// Resolve the folder a new node would live in: `None` is the
    /// requester's root, otherwise an active folder whose tenant becomes
    /// the new node's tenant.
    async fn destination(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
    ) -> AppResult<(TenantId, Option<Folder>)> {
        match parent_id {
            Some(id) => {
                let parent = self.nodes.get_active_folder(id).await?;
                Ok((parent.tenant_id, Some(parent)))
            }
            None => Ok((ctx.tenant_id, None)),
        }
    }
}

/// Reject a node that is frozen.
fn ensure_not_frozen(node: &Node) -> AppResult<()> {
    if node.is_frozen() {
        return Err(AppError::frozen(format!(
            "'{}' is frozen",
            node.display_name()
        )));
    }
    Ok(())
}

/// Trim and validate a display name.
pub(crate) fn validate_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(AppError::validation(format!("Invalid name: '{trimmed}'")));
    }
    Ok(trimmed.to_string())
}

/// Sort pinned entries first, keeping the repository order otherwise.
fn pinned_first(folders: &mut [Folder], files: &mut [File]) {
    folders.sort_by_key(|f| !f.pinned);
    files.sort_by_key(|f| !f.pinned);
}

/// Access mode reported to owners.
const OWNER_ACCESS: AccessMode = AccessMode::Edit;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Docs ").unwrap(), "Docs");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
    }
}
