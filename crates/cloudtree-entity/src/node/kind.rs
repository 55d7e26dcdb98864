//! Node kind tags, identifiers, and toggleable flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cloudtree_core::AppError;
use cloudtree_core::types::{FileId, FolderId};

/// Discriminates the two node variants in trash and share records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "node_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A folder.
    Folder,
    /// A file.
    File,
}

impl NodeKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of either node variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum NodeId {
    /// A folder identifier.
    Folder(FolderId),
    /// A file identifier.
    File(FileId),
}

impl NodeId {
    /// Rebuild a node identifier from a kind tag and raw UUID.
    pub fn from_parts(kind: NodeKind, id: Uuid) -> Self {
        match kind {
            NodeKind::Folder => Self::Folder(FolderId::from_uuid(id)),
            NodeKind::File => Self::File(FileId::from_uuid(id)),
        }
    }

    /// The kind tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Folder(_) => NodeKind::Folder,
            Self::File(_) => NodeKind::File,
        }
    }

    /// The raw UUID.
    pub fn as_uuid(&self) -> Uuid {
        match self {
            Self::Folder(id) => id.into_uuid(),
            Self::File(id) => id.into_uuid(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.as_uuid())
    }
}

impl FromStr for NodeId {
    type Err = AppError;

    /// Parse the `kind:uuid` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| AppError::validation(format!("Expected kind:uuid, got '{s}'")))?;
        let id = Uuid::parse_str(id)
            .map_err(|e| AppError::validation(format!("Invalid node UUID '{id}': {e}")))?;
        let kind = match kind.to_lowercase().as_str() {
            "folder" => NodeKind::Folder,
            "file" => NodeKind::File,
            other => return Err(AppError::validation(format!("Unknown node kind: {other}"))),
        };
        Ok(Self::from_parts(kind, id))
    }
}

impl From<FolderId> for NodeId {
    fn from(id: FolderId) -> Self {
        Self::Folder(id)
    }
}

impl From<FileId> for NodeId {
    fn from(id: FileId) -> Self {
        Self::File(id)
    }
}

/// Independently toggleable boolean flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeFlag {
    /// Marked as a favorite.
    Favorite,
    /// Listed before unpinned siblings.
    Pinned,
    /// Structural mutation blocked.
    Frozen,
}

impl NodeFlag {
    /// Column name backing this flag.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Pinned => "pinned",
            Self::Frozen => "frozen",
        }
    }
}

impl fmt::Display for NodeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for NodeFlag {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "favorite" => Ok(Self::Favorite),
            "pinned" | "pin" => Ok(Self::Pinned),
            "frozen" | "freeze" => Ok(Self::Frozen),
            other => Err(AppError::validation(format!("Unknown node flag: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_parts_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = NodeId::from_parts(NodeKind::File, uuid);
        assert_eq!(id, NodeId::File(FileId::from_uuid(uuid)));
        assert_eq!(id.kind(), NodeKind::File);
        assert_eq!(id.as_uuid(), uuid);
        assert_eq!(id.to_string(), format!("file:{uuid}"));
        assert_eq!(id.to_string().parse::<NodeId>().ok(), Some(id));
        assert!(format!("link:{uuid}").parse::<NodeId>().is_err());
        assert!("folder".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_flag_parse() {
        assert_eq!("pin".parse::<NodeFlag>().ok(), Some(NodeFlag::Pinned));
        assert_eq!("FROZEN".parse::<NodeFlag>().ok(), Some(NodeFlag::Frozen));
        assert!("shared".parse::<NodeFlag>().is_err());
    }
}
