//! # cloudtree-database
//!
//! Repository contracts for the tree and tenant records, their PostgreSQL
//! implementations, and an in-memory implementation with identical
//! semantics.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod traits;

pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use migration::{MigrationStatus, migration_status, run_migrations};
pub use repositories::{PgTenantRepository, PgTreeRepository};
pub use traits::{
    FileRepository, FolderRepository, ShareRepository, TenantRepository, TrashRepository,
    TreeRepository,
};
