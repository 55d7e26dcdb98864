//! Share entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cloudtree_core::AppError;
use cloudtree_core::types::{ShareRecordId, TenantId};

use crate::node::{NodeId, NodeKind};

/// Access mode granted to requesters outside the owning tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Read-only actions.
    Read,
    /// Read and mutating actions.
    Edit,
}

/// Class of action a requester wants to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareAction {
    /// Listing, downloading.
    Read,
    /// Creating, renaming, moving, deleting.
    Write,
}

impl AccessMode {
    /// Whether this mode permits the given action.
    pub fn permits(&self, action: ShareAction) -> bool {
        match (self, action) {
            (_, ShareAction::Read) => true,
            (Self::Edit, ShareAction::Write) => true,
            (Self::Read, ShareAction::Write) => false,
        }
    }

    /// Return the mode as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "edit" => Ok(Self::Edit),
            other => Err(AppError::validation(format!("Unknown access mode: {other}"))),
        }
    }
}

/// Sharing configuration of a single node. One record per (target, kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ShareRecord {
    /// Unique record identifier.
    pub id: ShareRecordId,
    /// Tenant owning the shared node.
    pub tenant_id: TenantId,
    /// Kind of the shared node.
    pub target_kind: NodeKind,
    /// Raw identifier of the shared node.
    pub target_id: Uuid,
    /// Granted mode.
    pub access_mode: AccessMode,
    /// Whether external access is currently enabled.
    pub open: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ShareRecord {
    /// The shared node's identifier.
    pub fn target(&self) -> NodeId {
        NodeId::from_parts(self.target_kind, self.target_id)
    }
}

/// Mode and open flag applied by a share operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSettings {
    /// Granted mode.
    pub access_mode: AccessMode,
    /// Whether external access is enabled.
    pub open: bool,
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            access_mode: AccessMode::Read,
            open: true,
        }
    }
}
