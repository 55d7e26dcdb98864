//! Node-level access to the tree repository shared by the managers and
//! the engine.

use std::collections::HashSet;
use std::sync::Arc;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::{FolderId, TenantId};
use cloudtree_database::traits::{FileRepository, FolderRepository, TreeRepository};
use cloudtree_entity::{File, Folder, Node, NodeId};

/// Direct children (or roots) of one location.
#[derive(Debug, Clone, Default)]
pub struct Children {
    /// Child folders.
    pub folders: Vec<Folder>,
    /// Child files.
    pub files: Vec<File>,
}

/// Reads and writes [`Node`]s by dispatching on their kind.
#[derive(Clone)]
pub struct NodeStore {
    tree: Arc<dyn TreeRepository>,
}

impl std::fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStore").finish_non_exhaustive()
    }
}

impl NodeStore {
    /// Wrap a tree repository.
    pub fn new(tree: Arc<dyn TreeRepository>) -> Self {
        Self { tree }
    }

    /// The wrapped repository.
    pub fn repository(&self) -> &Arc<dyn TreeRepository> {
        &self.tree
    }

    /// Find a node in any state.
    pub async fn find(&self, id: NodeId) -> AppResult<Option<Node>> {
        Ok(match id {
            NodeId::Folder(id) => self.tree.find_folder(id).await?.map(Node::Folder),
            NodeId::File(id) => self.tree.find_file(id).await?.map(Node::File),
        })
    }

    /// Find a node in any state, failing with `NotFound`.
    pub async fn get(&self, id: NodeId) -> AppResult<Node> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{id} not found")))
    }

    /// Find a node that is not trashed, failing with `NotFound`.
    pub async fn get_active(&self, id: NodeId) -> AppResult<Node> {
        match self.find(id).await? {
            Some(node) if !node.is_trashed() => Ok(node),
            _ => Err(AppError::not_found(format!("{id} not found"))),
        }
    }

    /// Find a folder that is not trashed, failing with `NotFound`.
    pub async fn get_active_folder(&self, id: FolderId) -> AppResult<Folder> {
        match self.tree.find_folder(id).await? {
            Some(folder) if !folder.trashed => Ok(folder),
            _ => Err(AppError::not_found(format!("Folder {id} not found"))),
        }
    }

    /// Persist a node.
    pub async fn save(&self, node: &Node) -> AppResult<Node> {
        Ok(match node {
            Node::Folder(folder) => Node::Folder(self.tree.update_folder(folder).await?),
            Node::File(file) => Node::File(self.tree.update_file(file).await?),
        })
    }

    /// Whether an active sibling of `node` under `parent_id` already uses
    /// the node's name. The node itself never counts.
    pub async fn name_taken(&self, node: &Node, parent_id: Option<FolderId>) -> AppResult<bool> {
        match node {
            Node::Folder(folder) => {
                self.tree
                    .folder_name_exists(folder.tenant_id, parent_id, &folder.name, Some(folder.id))
                    .await
            }
            Node::File(file) => {
                self.tree
                    .file_name_exists(
                        file.tenant_id,
                        parent_id,
                        &file.name,
                        &file.extension,
                        Some(file.id),
                    )
                    .await
            }
        }
    }

    /// Children of a folder whose trashed flag equals `trashed`.
    pub async fn children(&self, parent_id: FolderId, trashed: bool) -> AppResult<Children> {
        Ok(Children {
            folders: self.tree.find_child_folders(parent_id, trashed).await?,
            files: self.tree.find_child_files(parent_id, trashed).await?,
        })
    }

    /// Parentless nodes of a tenant whose trashed flag equals `trashed`.
    pub async fn roots(&self, tenant_id: TenantId, trashed: bool) -> AppResult<Children> {
        Ok(Children {
            folders: self.tree.find_root_folders(tenant_id, trashed).await?,
            files: self.tree.find_root_files(tenant_id, trashed).await?,
        })
    }

    /// Whether `candidate` is `ancestor` or lies somewhere below it.
    ///
    /// The walk stops at a folder it has already visited.
    pub async fn is_within(&self, candidate: FolderId, ancestor: FolderId) -> AppResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate);
        while let Some(id) = cursor {
            if id == ancestor {
                return Ok(true);
            }
            if !visited.insert(id) {
                return Ok(false);
            }
            cursor = match self.tree.find_folder(id).await? {
                Some(folder) => folder.parent_id,
                None => None,
            };
        }
        Ok(false)
    }
}
