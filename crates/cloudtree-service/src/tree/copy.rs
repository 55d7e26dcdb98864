//! Recursive deep copy.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{info, warn};

use cloudtree_core::error::AppError;
use cloudtree_core::result::AppResult;
use cloudtree_core::types::{FolderId, StorageKey, TenantId};
use cloudtree_database::traits::{FileRepository, FolderRepository};
use cloudtree_entity::{CreateFile, CreateFolder, File, Folder, Node, NodeId};

use super::{COPY_SUFFIX, TreeEngine};
use crate::context::RequestContext;

/// Where a copy lands.
#[derive(Debug, Clone, Copy)]
struct Target {
    tenant_id: TenantId,
    parent_id: Option<FolderId>,
}

impl TreeEngine {
    /// Deep-copy a node under `new_parent_id` (or the requester's root).
    ///
    /// A copy placed next to its source gets a `_(copy)` suffix. Every
    /// copied file receives fresh contents under a new storage key and is
    /// charged to the destination tenant. Frozen sources may be copied.
    pub async fn copy(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        new_parent_id: Option<FolderId>,
    ) -> AppResult<Node> {
        let source = self.nodes.get_active(id).await?;
        let (tenant_id, _) = self.destination(ctx, new_parent_id).await?;
        let target = Target {
            tenant_id,
            parent_id: new_parent_id,
        };

        if let (NodeId::Folder(folder_id), Some(parent_id)) = (id, new_parent_id) {
            if self.nodes.is_within(parent_id, folder_id).await? {
                return Err(AppError::not_allowed(
                    "A folder cannot be copied into itself or its descendants",
                ));
            }
        }

        let in_place = source.parent_id() == new_parent_id && source.tenant_id() == tenant_id;
        let copied = match source {
            Node::File(file) => {
                let (name, extension) = copy_file_name(&file, in_place);
                self.ensure_file_name_free(target, &name, &extension).await?;
                self.quota.ensure_capacity(tenant_id, file.size_bytes).await?;
                Node::File(self.copy_file(&file, target, name, extension).await?)
            }
            Node::Folder(folder) => {
                let name = if in_place {
                    format!("{}{COPY_SUFFIX}", folder.name)
                } else {
                    folder.name.clone()
                };
                self.ensure_folder_name_free(target, &name).await?;
                let total = self.subtree_bytes(folder.id).await?;
                self.quota.ensure_capacity(tenant_id, total).await?;
                Node::Folder(self.copy_folder(folder, target, name).await?)
            }
        };

        info!(
            source = %id,
            copy = %copied.id(),
            tenant_id = %tenant_id,
            "Node copied"
        );
        Ok(copied)
    }

    async fn ensure_folder_name_free(&self, target: Target, name: &str) -> AppResult<()> {
        if self
            .nodes
            .repository()
            .folder_name_exists(target.tenant_id, target.parent_id, name, None)
            .await?
        {
            return Err(AppError::already_exists(format!(
                "Folder '{name}' already exists at the destination"
            )));
        }
        Ok(())
    }

    async fn ensure_file_name_free(
        &self,
        target: Target,
        name: &str,
        extension: &str,
    ) -> AppResult<()> {
        if self
            .nodes
            .repository()
            .file_name_exists(target.tenant_id, target.parent_id, name, extension, None)
            .await?
        {
            return Err(AppError::already_exists(format!(
                "File '{name}{extension}' already exists at the destination"
            )));
        }
        Ok(())
    }

    /// Total size of the active files below a folder.
    fn subtree_bytes<'a>(&'a self, folder_id: FolderId) -> BoxFuture<'a, AppResult<i64>> {
        async move {
            let children = self.nodes.children(folder_id, false).await?;
            let mut total: i64 = children.files.iter().map(|f| f.size_bytes).sum();
            for child in children.folders {
                total += self.subtree_bytes(child.id).await?;
            }
            Ok(total)
        }
        .boxed()
    }

    /// Create the folder copy, then copy its files and subfolders into it.
    fn copy_folder<'a>(
        &'a self,
        source: Folder,
        target: Target,
        name: String,
    ) -> BoxFuture<'a, AppResult<Folder>> {
        async move {
            let created = self
                .nodes
                .repository()
                .create_folder(&CreateFolder {
                    tenant_id: target.tenant_id,
                    parent_id: target.parent_id,
                    name,
                    storage_key: StorageKey::generate(),
                })
                .await?;

            let inner = Target {
                tenant_id: target.tenant_id,
                parent_id: Some(created.id),
            };
            let children = self.nodes.children(source.id, false).await?;
            for file in &children.files {
                self.quota
                    .ensure_capacity(target.tenant_id, file.size_bytes)
                    .await?;
                self.copy_file(file, inner, file.name.clone(), file.extension.clone())
                    .await?;
            }
            for child in children.folders {
                let child_name = child.name.clone();
                self.copy_folder(child, inner, child_name).await?;
            }
            Ok(created)
        }
        .boxed()
    }

    async fn copy_file(
        &self,
        source: &File,
        target: Target,
        name: String,
        extension: String,
    ) -> AppResult<File> {
        let key = self.store.duplicate(&source.storage_key).await?;

        let created = self
            .nodes
            .repository()
            .create_file(&CreateFile {
                tenant_id: target.tenant_id,
                parent_id: target.parent_id,
                name,
                extension,
                size_bytes: source.size_bytes,
                storage_key: key.clone(),
            })
            .await;

        let file = match created {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&key).await {
                    warn!(key = %key, error = %cleanup, "Failed to remove orphaned copy");
                }
                return Err(e);
            }
        };

        self.charge_new_file(&file).await?;
        Ok(file)
    }
}

/// Name of a file copy: the stem gains the copy suffix when the copy lands
/// next to its source.
fn copy_file_name(file: &File, in_place: bool) -> (String, String) {
    if in_place {
        (format!("{}{COPY_SUFFIX}", file.name), file.extension.clone())
    } else {
        (file.name.clone(), file.extension.clone())
    }
}
