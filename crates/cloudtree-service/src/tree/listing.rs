//! Read paths: folder listings, trash, flagged nodes and file contents.

use bytes::Bytes;
use serde::Serialize;

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::traits::storage::ByteStream;
use cloudtree_core::types::{FileId, FolderId};
use cloudtree_database::traits::{FileRepository, FolderRepository};
use cloudtree_entity::{AccessMode, File, Folder, Node, NodeFlag, NodeId};

use super::{OWNER_ACCESS, TreeEngine, pinned_first};
use crate::context::RequestContext;

/// Contents of one location as seen by the requester.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// The listed folder, `None` for the tenant root.
    pub folder: Option<Folder>,
    /// Access mode the requester holds on the listed location.
    pub access: AccessMode,
    /// Child folders, pinned first.
    pub folders: Vec<Folder>,
    /// Child files, pinned first.
    pub files: Vec<File>,
}

impl Listing {
    /// Number of entries in the listing.
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Whether the listing has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TreeEngine {
    /// List the active children of `parent_id`, or the requester's root.
    ///
    /// Owners see everything with edit access. Other tenants only reach a
    /// folder through an open share record and then only see children that
    /// are themselves shared.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
    ) -> AppResult<Listing> {
        let Some(parent_id) = parent_id else {
            let mut children = self.nodes.roots(ctx.tenant_id, false).await?;
            pinned_first(&mut children.folders, &mut children.files);
            return Ok(Listing {
                folder: None,
                access: OWNER_ACCESS,
                folders: children.folders,
                files: children.files,
            });
        };

        let folder = self.nodes.get_active_folder(parent_id).await?;
        let mut children = self.nodes.children(parent_id, false).await?;

        let access = if ctx.owns(folder.tenant_id) {
            OWNER_ACCESS
        } else {
            let Some(mode) = self
                .sharing
                .external_access(NodeId::Folder(parent_id))
                .await?
            else {
                return Err(AppError::not_allowed(format!(
                    "Folder '{}' is not shared",
                    folder.name
                )));
            };
            children.folders.retain(|f| f.shared);
            children.files.retain(|f| f.shared);
            mode
        };

        pinned_first(&mut children.folders, &mut children.files);
        Ok(Listing {
            folder: Some(folder),
            access,
            folders: children.folders,
            files: children.files,
        })
    }

    /// Nodes in the requester's trash.
    pub async fn list_trash(&self, ctx: &RequestContext) -> AppResult<Vec<Node>> {
        self.trash.list(ctx.tenant_id).await
    }

    /// Active nodes of the requester's tenant with `flag` set.
    pub async fn list_flagged(&self, ctx: &RequestContext, flag: NodeFlag) -> AppResult<Vec<Node>> {
        let repo = self.nodes.repository();
        let mut folders = repo.find_folders_by_flag(ctx.tenant_id, flag).await?;
        let mut files = repo.find_files_by_flag(ctx.tenant_id, flag).await?;
        pinned_first(&mut folders, &mut files);
        Ok(folders
            .into_iter()
            .map(Node::Folder)
            .chain(files.into_iter().map(Node::File))
            .collect())
    }

    /// Stream the contents of an active file.
    pub async fn open_file(
        &self,
        _ctx: &RequestContext,
        id: FileId,
    ) -> AppResult<(File, ByteStream)> {
        let file = self.active_file(id).await?;
        let stream = self.store.get(&file.storage_key).await?;
        Ok((file, stream))
    }

    /// Read the contents of an active file into memory.
    pub async fn read_file(&self, _ctx: &RequestContext, id: FileId) -> AppResult<(File, Bytes)> {
        let file = self.active_file(id).await?;
        let data = self.store.read_bytes(&file.storage_key).await?;
        Ok((file, data))
    }

    async fn active_file(&self, id: FileId) -> AppResult<File> {
        match self.nodes.get_active(NodeId::File(id)).await? {
            Node::File(file) => Ok(file),
            Node::Folder(_) => Err(AppError::internal("File lookup returned a folder")),
        }
    }
}
