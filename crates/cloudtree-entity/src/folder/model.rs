//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudtree_core::types::{FolderId, StorageKey, TenantId};

/// A folder in a tenant's tree. Folders are pure metadata containers; their
/// storage key is reserved but never written to the byte store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Parent folder ID (null for root folders and for trashed folders).
    pub parent_id: Option<FolderId>,
    /// Display name.
    pub name: String,
    /// Opaque key generated at creation.
    pub storage_key: StorageKey,
    /// Whether the folder sits in the trash.
    pub trashed: bool,
    /// Whether the folder is listed before unpinned siblings.
    pub pinned: bool,
    /// Whether structural mutation is blocked.
    pub frozen: bool,
    /// Whether the owner marked the folder as a favorite.
    pub favorite: bool,
    /// Mirrors the `open` flag of the folder's share record.
    pub shared: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Parent folder (None for root).
    pub parent_id: Option<FolderId>,
    /// Display name.
    pub name: String,
    /// Freshly generated storage key.
    pub storage_key: StorageKey,
}
