//! Shared test helpers for integration tests.

use std::sync::Arc;

use cloudtree_core::config::{QuotaConfig, StorageConfig};
use cloudtree_core::error::{AppError, ErrorKind};
use cloudtree_core::result::AppResult;
use cloudtree_core::types::{FileId, FolderId};
use cloudtree_database::MemoryDatabase;
use cloudtree_database::traits::{FileRepository, TrashRepository};
use cloudtree_entity::{File, Folder, Node, NodeId};
use cloudtree_service::{
    FileUpload, QuotaLedger, RequestContext, StatisticsService, TenantService, TreeEngine,
};
use cloudtree_storage::MemoryByteStore;

/// Test application context
pub struct TestApp {
    /// Repository the engine writes to, for direct inspection
    pub db: Arc<MemoryDatabase>,
    /// Byte store the engine writes to
    pub store: Arc<MemoryByteStore>,
    /// Engine under test
    pub engine: TreeEngine,
    /// Tenant lifecycle
    pub tenants: TenantService,
    /// Usage reports
    pub stats: StatisticsService,
}

impl TestApp {
    /// Assemble every service on fresh in-memory backends.
    pub fn new() -> Self {
        Self::with_storage(StorageConfig::default())
    }

    /// Same as [`TestApp::new`] with explicit storage limits.
    pub fn with_storage(storage: StorageConfig) -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let store = Arc::new(MemoryByteStore::new());
        let quota = Arc::new(QuotaLedger::new(db.clone()));
        let engine = TreeEngine::new(db.clone(), store.clone(), quota.clone(), &storage);
        let tenants = TenantService::new(
            db.clone(),
            db.clone(),
            store.clone(),
            QuotaConfig {
                default_allocated_bytes: 1_000_000,
            },
        );
        let stats = StatisticsService::new(db.clone(), quota);
        Self {
            db,
            store,
            engine,
            tenants,
            stats,
        }
    }

    /// Provision a tenant and return a context acting on its behalf.
    pub async fn tenant(&self, name: &str, allocated_bytes: i64) -> RequestContext {
        let tenant = self
            .tenants
            .provision(name, Some(allocated_bytes))
            .await
            .expect("provision tenant");
        RequestContext::new(tenant.id)
    }

    /// Create a folder, panicking on failure.
    pub async fn mkdir(
        &self,
        ctx: &RequestContext,
        parent: Option<FolderId>,
        name: &str,
    ) -> Folder {
        self.engine
            .create_folder(ctx, parent, name)
            .await
            .expect("create folder")
    }

    /// Upload `size` bytes under `name`.
    pub async fn try_upload(
        &self,
        ctx: &RequestContext,
        parent: Option<FolderId>,
        name: &str,
        size: usize,
    ) -> AppResult<File> {
        self.engine
            .upload_file(ctx, parent, FileUpload::new(name, vec![b'x'; size]))
            .await
    }

    /// Upload `size` bytes under `name`, panicking on failure.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        parent: Option<FolderId>,
        name: &str,
        size: usize,
    ) -> File {
        self.try_upload(ctx, parent, name, size)
            .await
            .expect("upload file")
    }

    /// Bytes currently charged to the context's tenant.
    pub async fn used(&self, ctx: &RequestContext) -> i64 {
        self.stats
            .usage(ctx.tenant_id)
            .await
            .expect("usage")
            .used_bytes
    }

    /// Reload a file record in any state.
    pub async fn file(&self, id: FileId) -> Option<File> {
        self.db.find_file(id).await.expect("find file")
    }

    /// Whether the trash state of a node agrees with its trash record.
    pub async fn trash_state_consistent(&self, node: &Node) -> bool {
        let record = self
            .db
            .find_trash_record(node.id())
            .await
            .expect("find trash record");
        if node.is_trashed() {
            node.parent_id().is_none() && record.is_some()
        } else {
            record.is_none()
        }
    }

    /// Reload a node in any state.
    pub async fn node(&self, id: NodeId) -> Node {
        self.engine.get(id).await.expect("node exists")
    }
}

/// Assert that a result failed with the given kind.
pub fn assert_kind<T: std::fmt::Debug>(result: Result<T, AppError>, kind: ErrorKind) {
    match result {
        Ok(value) => panic!("expected {kind:?}, got Ok({value:?})"),
        Err(e) => assert_eq!(e.kind, kind, "unexpected error: {e}"),
    }
}
