//! Trash record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cloudtree_core::types::{FolderId, TenantId, TrashRecordId};

use crate::node::{NodeId, NodeKind};

/// Remembers where a trashed node lived so it can be restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TrashRecord {
    /// Unique record identifier.
    pub id: TrashRecordId,
    /// Tenant owning the trashed node.
    pub tenant_id: TenantId,
    /// Kind of the trashed node.
    pub target_kind: NodeKind,
    /// Raw identifier of the trashed node.
    pub target_id: Uuid,
    /// Parent the node was detached from (None when it was at the root).
    pub original_parent_id: Option<FolderId>,
    /// When the node was trashed.
    pub trashed_at: DateTime<Utc>,
}

impl TrashRecord {
    /// The trashed node's identifier.
    pub fn target(&self) -> NodeId {
        NodeId::from_parts(self.target_kind, self.target_id)
    }
}

/// Data required to create a trash record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrashRecord {
    /// Tenant owning the node.
    pub tenant_id: TenantId,
    /// Node being trashed.
    pub target: NodeId,
    /// Parent it is detached from.
    pub original_parent_id: Option<FolderId>,
}
