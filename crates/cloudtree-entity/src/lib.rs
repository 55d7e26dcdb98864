//! # cloudtree-entity
//!
//! Domain records for CloudTree. Every struct in this crate represents a
//! database table row or a domain value object. Persisted records derive
//! `sqlx::FromRow` in addition to `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod file;
pub mod folder;
pub mod node;
pub mod share;
pub mod statistics;
pub mod tenant;
pub mod trash;

pub use file::{CreateFile, File};
pub use folder::{CreateFolder, Folder};
pub use node::{Node, NodeFlag, NodeId, NodeKind};
pub use share::{AccessMode, ShareAction, ShareRecord, ShareSettings};
pub use statistics::{Category, CategoryUsage};
pub use tenant::{CreateTenant, QuotaUsage, Tenant, UsageAdjustment};
pub use trash::{CreateTrashRecord, TrashRecord};
