//! Node: a folder or a file seen through their shared base.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use cloudtree_core::types::{FolderId, StorageKey, TenantId};

use super::kind::{NodeFlag, NodeId, NodeKind};
use crate::file::File;
use crate::folder::Folder;

/// Either variant of the tree, dispatched by its explicit kind tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// A folder.
    Folder(Folder),
    /// A file.
    File(File),
}

impl Node {
    /// The node's identifier.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Folder(f) => NodeId::Folder(f.id),
            Self::File(f) => NodeId::File(f.id),
        }
    }

    /// The kind tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Folder(_) => NodeKind::Folder,
            Self::File(_) => NodeKind::File,
        }
    }

    /// Owning tenant.
    pub fn tenant_id(&self) -> TenantId {
        match self {
            Self::Folder(f) => f.tenant_id,
            Self::File(f) => f.tenant_id,
        }
    }

    /// Current parent folder.
    pub fn parent_id(&self) -> Option<FolderId> {
        match self {
            Self::Folder(f) => f.parent_id,
            Self::File(f) => f.parent_id,
        }
    }

    /// Name as shown to users (files include their extension).
    pub fn display_name(&self) -> String {
        match self {
            Self::Folder(f) => f.name.clone(),
            Self::File(f) => f.display_name(),
        }
    }

    /// Opaque storage key.
    pub fn storage_key(&self) -> &StorageKey {
        match self {
            Self::Folder(f) => &f.storage_key,
            Self::File(f) => &f.storage_key,
        }
    }

    /// Whether the node sits in the trash.
    pub fn is_trashed(&self) -> bool {
        match self {
            Self::Folder(f) => f.trashed,
            Self::File(f) => f.trashed,
        }
    }

    /// Whether structural mutation is blocked.
    pub fn is_frozen(&self) -> bool {
        self.flag(NodeFlag::Frozen)
    }

    /// Whether the node's share record is open.
    pub fn is_shared(&self) -> bool {
        match self {
            Self::Folder(f) => f.shared,
            Self::File(f) => f.shared,
        }
    }

    /// Read a toggleable flag.
    pub fn flag(&self, flag: NodeFlag) -> bool {
        let (favorite, pinned, frozen) = match self {
            Self::Folder(f) => (f.favorite, f.pinned, f.frozen),
            Self::File(f) => (f.favorite, f.pinned, f.frozen),
        };
        match flag {
            NodeFlag::Favorite => favorite,
            NodeFlag::Pinned => pinned,
            NodeFlag::Frozen => frozen,
        }
    }

    /// Write a toggleable flag.
    pub fn set_flag(&mut self, flag: NodeFlag, value: bool) {
        let (favorite, pinned, frozen) = match self {
            Self::Folder(f) => (&mut f.favorite, &mut f.pinned, &mut f.frozen),
            Self::File(f) => (&mut f.favorite, &mut f.pinned, &mut f.frozen),
        };
        match flag {
            NodeFlag::Favorite => *favorite = value,
            NodeFlag::Pinned => *pinned = value,
            NodeFlag::Frozen => *frozen = value,
        }
        self.touch();
    }

    /// Reattach (or detach, with `None`) the node.
    pub fn set_parent(&mut self, parent_id: Option<FolderId>) {
        match self {
            Self::Folder(f) => f.parent_id = parent_id,
            Self::File(f) => f.parent_id = parent_id,
        }
        self.touch();
    }

    /// Mark the node as trashed or active.
    pub fn set_trashed(&mut self, trashed: bool) {
        match self {
            Self::Folder(f) => f.trashed = trashed,
            Self::File(f) => f.trashed = trashed,
        }
        self.touch();
    }

    /// Mirror a share record's `open` flag.
    pub fn set_shared(&mut self, shared: bool) {
        match self {
            Self::Folder(f) => f.shared = shared,
            Self::File(f) => f.shared = shared,
        }
        self.touch();
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        let now = Utc::now();
        match self {
            Self::Folder(f) => f.updated_at = now,
            Self::File(f) => f.updated_at = now,
        }
    }

    /// Unwrap the folder variant.
    pub fn into_folder(self) -> Option<Folder> {
        match self {
            Self::Folder(f) => Some(f),
            Self::File(_) => None,
        }
    }

    /// Unwrap the file variant.
    pub fn into_file(self) -> Option<File> {
        match self {
            Self::File(f) => Some(f),
            Self::Folder(_) => None,
        }
    }
}

impl From<Folder> for Node {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}
