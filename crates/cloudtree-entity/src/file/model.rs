//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudtree_core::types::{FileId, FolderId, StorageKey, TenantId};

/// A file stored in a tenant's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Containing folder (null at the root and while trashed).
    pub parent_id: Option<FolderId>,
    /// Name without the extension.
    pub name: String,
    /// Extension including the leading dot (empty when there is none).
    pub extension: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Opaque byte-store key holding the contents.
    pub storage_key: StorageKey,
    /// Whether the file sits in the trash.
    pub trashed: bool,
    /// Whether the file is listed before unpinned siblings.
    pub pinned: bool,
    /// Whether structural mutation is blocked.
    pub frozen: bool,
    /// Whether the owner marked the file as a favorite.
    pub favorite: bool,
    /// Mirrors the `open` flag of the file's share record.
    pub shared: bool,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Name and extension joined, as shown to users.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }

    /// Get the extension without the dot, lowercased, if any.
    pub fn extension_lowercase(&self) -> Option<String> {
        self.extension
            .strip_prefix('.')
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Containing folder (None for root).
    pub parent_id: Option<FolderId>,
    /// Name without the extension.
    pub name: String,
    /// Extension including the leading dot.
    pub extension: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Byte-store key the contents were written to.
    pub storage_key: StorageKey,
}

/// Split an uploaded file name into its stem and extension.
///
/// The extension keeps its leading dot. A leading dot alone (`.env`) or a
/// trailing dot (`notes.`) does not start an extension.
pub fn split_file_name(original: &str) -> (String, String) {
    match original.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < original.len() => (
            original[..idx].to_string(),
            original[idx..].to_string(),
        ),
        _ => (original.to_string(), String::new()),
    }
}
