//! # cloudtree-service
//!
//! Tree engine and the managers it composes. Every collaborator is handed
//! in at construction time as an `Arc`, so the engine runs unchanged on the
//! PostgreSQL or in-memory repositories and on any byte store.

pub mod context;
pub mod nodes;
pub mod quota;
pub mod sharing;
pub mod statistics;
pub mod tenant;
pub mod trash;
pub mod tree;

pub use context::RequestContext;
pub use nodes::{Children, NodeStore};
pub use quota::QuotaLedger;
pub use sharing::SharingManager;
pub use statistics::StatisticsService;
pub use tenant::TenantService;
pub use trash::TrashManager;
pub use tree::{COPY_SUFFIX, DeleteOutcome, FileUpload, Listing, TreeEngine};
